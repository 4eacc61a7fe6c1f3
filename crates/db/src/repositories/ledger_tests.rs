//! Tests for the ledger repository.

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::{
    ConnAcquireErr, DatabaseBackend, DbErr, MockDatabase, QueryTrait, RuntimeErr,
};
use tally_core::reports::{FilterBuilder, ReportCriteria};

use super::*;

fn model(id: i64, day: u32) -> activity_accounting::Model {
    activity_accounting::Model {
        id,
        date: Utc.with_ymd_and_hms(2024, 2, day, 8, 0, 0).unwrap().into(),
        user_email: "alice@example.com".to_string(),
        admin: None,
        status: "completed".to_string(),
        transaction_type: "deposit".to_string(),
        original_id: None,
        amount: dec!(10.00),
        currency: "EUR".to_string(),
        description: Some("top-up".to_string()),
    }
}

fn sql(predicate: &LedgerPredicate, offset: u64, limit: u64) -> String {
    select_page(predicate, offset, limit)
        .build(DatabaseBackend::Postgres)
        .to_string()
}

#[test]
fn test_universal_predicate_has_no_where_clause() {
    let sql = sql(&LedgerPredicate::universal(), 0, 1000);

    assert!(!sql.contains("WHERE"));
    assert!(sql.contains(r#""date" DESC"#));
    assert!(sql.contains(r#""id" ASC"#));
    assert!(sql.contains("LIMIT 1000"));
}

#[test]
fn test_clauses_become_conjoined_where() {
    let criteria = ReportCriteria::new()
        .with_user_email("alice@example.com")
        .with_status("completed")
        .with_transaction_type("refund");
    let predicate = FilterBuilder::build(&criteria).unwrap();

    let sql = sql(&predicate, 2000, 1000);

    assert!(sql.contains(r#""user_email" = 'alice@example.com'"#));
    assert!(sql.contains(r#""status" = 'completed'"#));
    assert!(sql.contains(r#""type" = 'refund'"#));
    assert_eq!(sql.matches(" AND ").count(), 2);
    assert!(sql.contains("OFFSET 2000"));
}

#[test]
fn test_date_range_uses_between() {
    let criteria = ReportCriteria::new().with_date_range(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
    );
    let predicate = FilterBuilder::build(&criteria).unwrap();

    assert!(sql(&predicate, 0, 10).contains(r#""date" BETWEEN"#));
}

#[tokio::test]
async fn test_single_page_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(2, 10), model(1, 3)]])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let rows = repo.fetch(&LedgerPredicate::universal()).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 2);
    assert_eq!(rows[0].transaction_type, "deposit");
    assert_eq!(rows[1].date, Utc.with_ymd_and_hms(2024, 2, 3, 8, 0, 0).unwrap());
}

#[tokio::test]
async fn test_reads_until_short_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![model(5, 9), model(4, 8)],
            vec![model(3, 7), model(2, 6)],
            vec![model(1, 5)],
        ])
        .into_connection();
    let repo = LedgerRepository::new(db).with_page_size(2);

    let rows = repo.fetch(&LedgerPredicate::universal()).await.unwrap();

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, [5, 4, 3, 2, 1]);

    let log = format!("{:?}", repo.db.into_transaction_log());
    assert_eq!(log.matches("SELECT").count(), 3, "one query per page");
}

#[tokio::test]
async fn test_pages_share_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(4, 9), model(3, 8)], vec![model(2, 7)]])
        .into_connection();
    let repo = LedgerRepository::new(db).with_page_size(2);

    repo.fetch(&LedgerPredicate::universal()).await.unwrap();

    let log = repo.db.into_transaction_log();
    assert_eq!(log.len(), 1, "every page inside a single transaction");

    let statements = format!("{log:?}");
    let begin = statements.find(r#""BEGIN""#).expect("transaction opened");
    let commit = statements.rfind(r#""COMMIT""#).expect("transaction committed");
    let first_select = statements.find("SELECT").unwrap();
    let last_select = statements.rfind("SELECT").unwrap();
    assert!(begin < first_select && last_select < commit);
}

#[tokio::test]
async fn test_empty_ledger_returns_no_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<activity_accounting::Model>::new()])
        .into_connection();

    let rows = LedgerRepository::new(db)
        .fetch(&LedgerPredicate::universal())
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_connection_errors_map_to_store_unavailable() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Conn(RuntimeErr::Internal("refused".into()))])
        .into_connection();

    let err = LedgerRepository::new(db)
        .fetch(&LedgerPredicate::universal())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_query_errors_map_to_query_failed() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("syntax error".into())])
        .into_connection();

    let err = LedgerRepository::new(db)
        .fetch(&LedgerPredicate::universal())
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::QueryFailed(msg) if msg.contains("syntax error")));
}

#[test]
fn test_acquire_timeout_is_unavailable() {
    let err = map_db_err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
    assert!(matches!(err, ReportError::StoreUnavailable(_)));
}

#[test]
fn test_zero_page_size_is_clamped() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    assert_eq!(LedgerRepository::new(db).with_page_size(0).page_size, 1);
}
