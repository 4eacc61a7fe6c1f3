//! Report pipeline data types.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::criteria::ReportCriteria;
use super::error::ReportError;

/// One row of the activity-accounting ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Row ID, increasing with insertion order.
    pub id: i64,
    /// When the activity happened.
    pub date: DateTime<Utc>,
    /// Email of the user the activity belongs to.
    pub user_email: String,
    /// Admin who recorded the activity.
    pub admin: Option<String>,
    /// Status tag (pending, completed, ...).
    pub status: String,
    /// Transaction type tag (deposit, withdrawal, ...).
    pub transaction_type: String,
    /// Reference to the original transaction, for refunds and reversals.
    pub original_id: Option<String>,
    /// Signed amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Free-form note.
    pub description: Option<String>,
}

/// A report asked for by a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Address that receives the retrieval link.
    pub recipient: String,
    /// Ledger slice to export.
    pub criteria: ReportCriteria,
}

impl ReportRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(recipient: impl Into<String>, criteria: ReportCriteria) -> Self {
        Self {
            recipient: recipient.into(),
            criteria,
        }
    }
}

/// A stored spreadsheet and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    /// Object storage key.
    pub key: String,
    /// URL or URI handed to the recipient.
    pub reference: String,
    /// Size of the stored object in bytes.
    pub size: u64,
}

/// Message content for the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryNotice {
    /// Recipient address.
    pub recipient: String,
    /// Retrieval reference of the artifact.
    pub reference: String,
    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,
}

/// Confirmation that a notice left through the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Recipient address.
    pub recipient: String,
    /// When the channel accepted the message.
    pub delivered_at: DateTime<Utc>,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// Request accepted, nothing done yet.
    Received,
    /// Ledger rows fetched.
    Queried,
    /// Spreadsheet bytes produced.
    Exported,
    /// Artifact persisted.
    Stored,
    /// Recipient notified.
    Notified,
}

impl PipelineStage {
    /// Returns the lowercase stage name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Queried => "queried",
            Self::Exported => "exported",
            Self::Stored => "stored",
            Self::Notified => "notified",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug)]
pub enum ReportOutcome {
    /// Every stage succeeded.
    Completed {
        /// The stored artifact.
        artifact: ReportArtifact,
        /// Delivery confirmation.
        receipt: DeliveryReceipt,
    },
    /// The pipeline stopped while trying to reach `stage`.
    Failed {
        /// Stage that could not be reached.
        stage: PipelineStage,
        /// Why.
        error: ReportError,
        /// Present only when the artifact was stored before the failure.
        artifact: Option<ReportArtifact>,
    },
}

impl ReportOutcome {
    /// Returns true if the recipient was notified.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Stage the pipeline failed to reach, if it failed.
    #[must_use]
    pub const fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { stage, .. } => Some(*stage),
        }
    }

    /// The stored artifact, whether or not notification succeeded.
    #[must_use]
    pub const fn artifact(&self) -> Option<&ReportArtifact> {
        match self {
            Self::Completed { artifact, .. } => Some(artifact),
            Self::Failed { artifact, .. } => artifact.as_ref(),
        }
    }
}
