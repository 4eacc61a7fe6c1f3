//! Report criteria: which slice of the ledger a report covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use super::filter::FilterBuilder;

/// Inclusive timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant included.
    pub start: DateTime<Utc>,
    /// Last instant included.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range. Ordering is checked by [`FilterBuilder::build`].
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `at` falls within the range, bounds included.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Filter criteria for one report.
///
/// Every field is optional; an absent field places no constraint on that
/// dimension, and criteria with every field absent select the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCriteria {
    /// Entry timestamp range.
    pub date_range: Option<DateRange>,
    /// Email of the user the entry belongs to.
    pub user_email: Option<String>,
    /// Admin who recorded the entry.
    pub admin: Option<String>,
    /// Entry status tag.
    pub status: Option<String>,
    /// Transaction type tag.
    pub transaction_type: Option<String>,
    /// Reference to the original transaction.
    pub original_id: Option<String>,
}

impl ReportCriteria {
    /// Creates criteria that select the whole ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to an inclusive date range.
    #[must_use]
    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// Restricts to one user.
    #[must_use]
    pub fn with_user_email(mut self, user_email: impl Into<String>) -> Self {
        self.user_email = Some(user_email.into());
        self
    }

    /// Restricts to one admin.
    #[must_use]
    pub fn with_admin(mut self, admin: impl Into<String>) -> Self {
        self.admin = Some(admin.into());
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Restricts to one transaction type.
    #[must_use]
    pub fn with_transaction_type(mut self, transaction_type: impl Into<String>) -> Self {
        self.transaction_type = Some(transaction_type.into());
        self
    }

    /// Restricts to entries referencing one original transaction.
    #[must_use]
    pub fn with_original_id(mut self, original_id: impl Into<String>) -> Self {
        self.original_id = Some(original_id.into());
        self
    }

    /// Treats empty or whitespace-only text fields as absent.
    #[must_use]
    pub fn without_blanks(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            date_range: self.date_range,
            user_email: keep(self.user_email),
            admin: keep(self.admin),
            status: keep(self.status),
            transaction_type: keep(self.transaction_type),
            original_id: keep(self.original_id),
        }
    }

    /// Returns true if no dimension is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.user_email.is_none()
            && self.admin.is_none()
            && self.status.is_none()
            && self.transaction_type.is_none()
            && self.original_id.is_none()
    }

    /// Checks the criteria without keeping the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidCriteria`] under the same conditions as
    /// [`FilterBuilder::build`].
    pub fn validate(&self) -> Result<(), ReportError> {
        FilterBuilder::build(self).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_criteria_is_empty() {
        assert!(ReportCriteria::new().is_empty());
        assert!(ReportCriteria::new().validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let criteria = ReportCriteria::new()
            .with_status("completed")
            .with_admin("root");

        assert!(!criteria.is_empty());
        assert_eq!(criteria.status.as_deref(), Some("completed"));
        assert_eq!(criteria.admin.as_deref(), Some("root"));
        assert!(criteria.user_email.is_none());
    }

    #[test]
    fn test_without_blanks_drops_empty_text() {
        let criteria = ReportCriteria::new()
            .with_status("")
            .with_admin("  \t")
            .with_user_email("alice@example.com")
            .without_blanks();

        assert!(criteria.status.is_none());
        assert!(criteria.admin.is_none());
        assert_eq!(criteria.user_email.as_deref(), Some("alice@example.com"));
        assert!(ReportCriteria::new().with_status(" ").without_blanks().is_empty());
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(at(1), at(3));
        assert!(range.contains(at(1)));
        assert!(range.contains(at(2)));
        assert!(range.contains(at(3)));
        assert!(!range.contains(at(4)));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let criteria = ReportCriteria::new().with_date_range(at(5), at(1));
        assert!(matches!(
            criteria.validate(),
            Err(ReportError::InvalidCriteria(_))
        ));
    }
}
