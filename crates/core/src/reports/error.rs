//! Report pipeline error types.

use thiserror::Error;

use crate::storage::StorageError;
use tally_shared::EmailError;

/// Errors that end a report pipeline.
///
/// Each variant belongs to exactly one stage, so the variant alone tells an
/// operator how far the report got.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The criteria cannot describe any slice of the ledger.
    #[error("Invalid report criteria: {0}")]
    InvalidCriteria(String),

    /// The ledger store could not be reached.
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    /// The ledger store rejected or failed the query.
    #[error("Ledger query failed: {0}")]
    QueryFailed(String),

    /// Rows could not be written as a spreadsheet.
    #[error("Spreadsheet serialization failed: {0}")]
    SerializationFailed(String),

    /// The artifact could not be persisted.
    #[error("Artifact write failed: {0}")]
    StoreWriteFailed(String),

    /// The artifact exists but the recipient could not be notified.
    #[error("Notification failed: {0}")]
    NotificationFailed(String),
}

impl ReportError {
    /// Create an invalid criteria error.
    #[must_use]
    pub fn invalid_criteria(msg: impl Into<String>) -> Self {
        Self::InvalidCriteria(msg.into())
    }

    /// Create a query failed error.
    #[must_use]
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }

    /// Create a serialization failed error.
    #[must_use]
    pub fn serialization_failed(msg: impl Into<String>) -> Self {
        Self::SerializationFailed(msg.into())
    }
}

impl From<StorageError> for ReportError {
    fn from(err: StorageError) -> Self {
        Self::StoreWriteFailed(err.to_string())
    }
}

impl From<EmailError> for ReportError {
    fn from(err: EmailError) -> Self {
        Self::NotificationFailed(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::SerializationFailed(err.to_string())
    }
}
