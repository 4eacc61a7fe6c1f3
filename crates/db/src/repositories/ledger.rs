//! Ledger repository: read-only access to activity_accounting for reports.

use sea_orm::{
    AccessMode, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IsolationLevel,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use tally_core::reports::{Clause, LedgerEntry, LedgerPredicate, LedgerReader, ReportError};
use tracing::debug;

use crate::entities::activity_accounting::{self, Column};

/// Rows fetched per query when no page size is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Ledger repository backed by `SeaORM`.
#[derive(Debug)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    page_size: u64,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of rows fetched per query.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = if page_size == 0 { 1 } else { page_size };
        self
    }

    /// Fetches every row matching `predicate`, newest first.
    ///
    /// Rows are read in pages of `page_size` so a large report never holds a
    /// single oversized result set. All pages are read inside one read-only
    /// `REPEATABLE READ` transaction, so rows written meanwhile cannot shift
    /// the offsets.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::StoreUnavailable`] if no connection can be
    /// obtained and [`ReportError::QueryFailed`] for any other database error.
    pub async fn find_matching(
        &self,
        predicate: &LedgerPredicate,
    ) -> Result<Vec<LedgerEntry>, ReportError> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(map_db_err)?;

        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let page = select_page(predicate, offset, self.page_size)
                .all(&txn)
                .await
                .map_err(map_db_err)?;
            let fetched = page.len() as u64;
            rows.extend(page.into_iter().map(LedgerEntry::from));

            if fetched < self.page_size {
                break;
            }
            offset += self.page_size;
        }
        txn.commit().await.map_err(map_db_err)?;

        debug!(
            rows = rows.len(),
            clauses = predicate.clauses().len(),
            "Ledger query complete"
        );
        Ok(rows)
    }
}

impl LedgerReader for LedgerRepository {
    async fn fetch(&self, predicate: &LedgerPredicate) -> Result<Vec<LedgerEntry>, ReportError> {
        self.find_matching(predicate).await
    }
}

/// One page of matching rows ordered by date descending, then id.
fn select_page(
    predicate: &LedgerPredicate,
    offset: u64,
    limit: u64,
) -> Select<activity_accounting::Entity> {
    let mut select = activity_accounting::Entity::find();
    if !predicate.is_universal() {
        select = select.filter(condition(predicate));
    }
    select
        .order_by_desc(Column::Date)
        .order_by_asc(Column::Id)
        .offset(offset)
        .limit(limit)
}

/// Translates a predicate into a conjunctive `WHERE` condition.
fn condition(predicate: &LedgerPredicate) -> Condition {
    predicate
        .clauses()
        .iter()
        .fold(Condition::all(), |cond, clause| {
            cond.add(match clause {
                Clause::DateBetween { start, end } => Column::Date.between(*start, *end),
                Clause::UserEmail(v) => Column::UserEmail.eq(v.as_str()),
                Clause::Admin(v) => Column::Admin.eq(v.as_str()),
                Clause::Status(v) => Column::Status.eq(v.as_str()),
                Clause::TransactionType(v) => Column::TransactionType.eq(v.as_str()),
                Clause::OriginalId(v) => Column::OriginalId.eq(v.as_str()),
            })
        })
}

fn map_db_err(err: DbErr) -> ReportError {
    match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
            ReportError::StoreUnavailable(err.to_string())
        }
        _ => ReportError::query_failed(err.to_string()),
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
