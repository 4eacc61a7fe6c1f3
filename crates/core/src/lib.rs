//! Report pipeline logic for Tally.
//!
//! This crate contains the asynchronous report pipeline with ZERO web or
//! database dependencies. The ledger, the artifact store and the notification
//! channel are reached through traits so the pipeline can be driven by the
//! real adapters or by in-process doubles.
//!
//! # Modules
//!
//! - `reports` - Criteria, filter building, spreadsheet export, notification and orchestration
//! - `storage` - Vendor-agnostic object storage for report artifacts

pub mod reports;
pub mod storage;
