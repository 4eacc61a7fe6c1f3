//! Ledger read capability.

use std::future::Future;

use super::error::ReportError;
use super::filter::LedgerPredicate;
use super::types::LedgerEntry;

/// Read access to the activity-accounting ledger.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait LedgerReader: Send + Sync {
    /// Returns every entry matching `predicate`, newest first.
    ///
    /// Entries sharing a timestamp keep insertion order. Connection failures
    /// surface as [`ReportError::StoreUnavailable`], anything else the store
    /// rejects as [`ReportError::QueryFailed`].
    fn fetch(
        &self,
        predicate: &LedgerPredicate,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>, ReportError>> + Send;
}
