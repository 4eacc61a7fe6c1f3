//! Translation of report criteria into a conjunctive ledger predicate.

use chrono::{DateTime, Utc};

use super::criteria::ReportCriteria;
use super::error::ReportError;
use super::types::LedgerEntry;

/// One constraint on a ledger column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `date BETWEEN start AND end`, both bounds included.
    DateBetween {
        /// Lower bound.
        start: DateTime<Utc>,
        /// Upper bound.
        end: DateTime<Utc>,
    },
    /// `user_email = value`.
    UserEmail(String),
    /// `admin = value`.
    Admin(String),
    /// `status = value`.
    Status(String),
    /// `type = value`.
    TransactionType(String),
    /// `original_id = value`.
    OriginalId(String),
}

impl Clause {
    /// Ledger column the clause constrains.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::DateBetween { .. } => "date",
            Self::UserEmail(_) => "user_email",
            Self::Admin(_) => "admin",
            Self::Status(_) => "status",
            Self::TransactionType(_) => "type",
            Self::OriginalId(_) => "original_id",
        }
    }

    /// Evaluates the clause against one entry.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        match self {
            Self::DateBetween { start, end } => *start <= entry.date && entry.date <= *end,
            Self::UserEmail(v) => entry.user_email == *v,
            Self::Admin(v) => entry.admin.as_deref() == Some(v.as_str()),
            Self::Status(v) => entry.status == *v,
            Self::TransactionType(v) => entry.transaction_type == *v,
            Self::OriginalId(v) => entry.original_id.as_deref() == Some(v.as_str()),
        }
    }
}

/// Conjunction of clauses. No clauses means every row matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerPredicate {
    clauses: Vec<Clause>,
}

impl LedgerPredicate {
    /// The predicate that matches the whole ledger.
    #[must_use]
    pub fn universal() -> Self {
        Self::default()
    }

    /// Clauses in build order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns true if the predicate places no constraint.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns true if every clause accepts `entry`.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.clauses.iter().all(|clause| clause.matches(entry))
    }
}

/// Builds ledger predicates from report criteria.
pub struct FilterBuilder;

impl FilterBuilder {
    /// Builds the predicate for `criteria`.
    ///
    /// Clauses appear in a fixed order: date range, user, admin, status,
    /// type, original id. A blank text field constrains nothing, so criteria
    /// with no non-blank field set produce [`LedgerPredicate::universal`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidCriteria`] if the range starts after it
    /// ends.
    pub fn build(criteria: &ReportCriteria) -> Result<LedgerPredicate, ReportError> {
        let mut clauses = Vec::new();

        if let Some(range) = criteria.date_range {
            if range.start > range.end {
                return Err(ReportError::invalid_criteria(format!(
                    "date range starts at {} after it ends at {}",
                    range.start.to_rfc3339(),
                    range.end.to_rfc3339()
                )));
            }
            clauses.push(Clause::DateBetween {
                start: range.start,
                end: range.end,
            });
        }

        let text_fields: [(Option<&String>, fn(String) -> Clause); 5] = [
            (criteria.user_email.as_ref(), Clause::UserEmail),
            (criteria.admin.as_ref(), Clause::Admin),
            (criteria.status.as_ref(), Clause::Status),
            (criteria.transaction_type.as_ref(), Clause::TransactionType),
            (criteria.original_id.as_ref(), Clause::OriginalId),
        ];

        for (value, clause) in text_fields {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                clauses.push(clause(value.clone()));
            }
        }

        Ok(LedgerPredicate { clauses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap()
    }

    fn entry() -> LedgerEntry {
        LedgerEntry {
            id: 1,
            date: at(10),
            user_email: "alice@example.com".to_string(),
            admin: Some("root".to_string()),
            status: "completed".to_string(),
            transaction_type: "deposit".to_string(),
            original_id: None,
            amount: dec!(125.50),
            currency: "USD".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_empty_criteria_builds_universal_predicate() {
        let predicate = FilterBuilder::build(&ReportCriteria::new()).unwrap();
        assert!(predicate.is_universal());
        assert!(predicate.matches(&entry()));
        assert_eq!(predicate, LedgerPredicate::universal());
    }

    #[test]
    fn test_clauses_follow_fixed_order() {
        let criteria = ReportCriteria::new()
            .with_original_id("tx-1")
            .with_status("completed")
            .with_user_email("alice@example.com")
            .with_date_range(at(1), at(2));

        let columns: Vec<_> = FilterBuilder::build(&criteria)
            .unwrap()
            .clauses()
            .iter()
            .map(Clause::column)
            .collect();

        assert_eq!(columns, ["date", "user_email", "status", "original_id"]);
    }

    #[test]
    fn test_clauses_are_conjoined() {
        let matching = ReportCriteria::new()
            .with_status("completed")
            .with_transaction_type("deposit");
        let half_matching = ReportCriteria::new()
            .with_status("completed")
            .with_transaction_type("withdrawal");

        assert!(FilterBuilder::build(&matching).unwrap().matches(&entry()));
        assert!(!FilterBuilder::build(&half_matching).unwrap().matches(&entry()));
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let on_start = ReportCriteria::new().with_date_range(at(10), at(20));
        let on_end = ReportCriteria::new().with_date_range(at(1), at(10));
        let single_instant = ReportCriteria::new().with_date_range(at(10), at(10));
        let before = ReportCriteria::new().with_date_range(at(1), at(9));

        assert!(FilterBuilder::build(&on_start).unwrap().matches(&entry()));
        assert!(FilterBuilder::build(&on_end).unwrap().matches(&entry()));
        assert!(FilterBuilder::build(&single_instant).unwrap().matches(&entry()));
        assert!(!FilterBuilder::build(&before).unwrap().matches(&entry()));
    }

    #[test]
    fn test_inverted_range_is_rejected_not_swapped() {
        let criteria = ReportCriteria::new().with_date_range(at(20), at(10));
        let err = FilterBuilder::build(&criteria).unwrap_err();
        assert!(matches!(err, ReportError::InvalidCriteria(msg) if msg.contains("after it ends")));
    }

    #[test]
    fn test_blank_field_places_no_constraint() {
        let criteria = ReportCriteria::new().with_admin("   ").with_status("");
        let predicate = FilterBuilder::build(&criteria).unwrap();
        assert!(predicate.is_universal());

        let criteria = ReportCriteria::new().with_admin("").with_status("completed");
        let columns: Vec<_> = FilterBuilder::build(&criteria)
            .unwrap()
            .clauses()
            .iter()
            .map(Clause::column)
            .collect();
        assert_eq!(columns, ["status"]);
    }

    #[test]
    fn test_optional_columns_never_match_null() {
        let mut row = entry();
        row.admin = None;

        let predicate = FilterBuilder::build(&ReportCriteria::new().with_admin("root")).unwrap();
        assert!(!predicate.matches(&row));

        let predicate =
            FilterBuilder::build(&ReportCriteria::new().with_original_id("tx-1")).unwrap();
        assert!(!predicate.matches(&row));
    }
}
