//! Asynchronous ledger report generation.
//!
//! A report request flows through a fixed pipeline:
//!
//! ```text
//! Received ─► Queried ─► Exported ─► Stored ─► Notified
//!    │           │           │          │          │
//!    │     FilterBuilder  Tabular   Artifact   Notifier
//!    │     LedgerReader   Exporter   Store
//!    └────────── any failure ─► Failed(stage)
//! ```
//!
//! The [`ReportOrchestrator`] runs each request on its own task, detached
//! from the HTTP request that asked for it.

pub mod criteria;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod notifier;
pub mod orchestrator;
pub mod reader;
pub mod store;
pub mod types;


pub use criteria::{DateRange, ReportCriteria};
pub use error::ReportError;
pub use exporter::TabularExporter;
pub use filter::{Clause, FilterBuilder, LedgerPredicate};
pub use notifier::{EmailNotifier, Notifier};
pub use orchestrator::{
    DispatchError, PipelineSettings, ReportDispatcher, ReportOrchestrator, ReportTicket,
};
pub use reader::LedgerReader;
pub use store::{ArtifactStore, artifact_key};
pub use types::*;
