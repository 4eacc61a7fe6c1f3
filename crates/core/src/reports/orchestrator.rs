//! Detached execution of report pipelines.
//!
//! A dispatched request returns a [`ReportTicket`] at once; the stages run
//! on a tracked background task:
//!
//! ```text
//! Received -> Queried -> Exported -> Stored -> Notified
//! ```
//!
//! Any stage error ends the run as `Failed(stage)`. Outcomes are only
//! logged; nothing is reported back to the original caller.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use tally_shared::types::ReportId;
use tally_shared::{KeyStrategy, ReportsConfig};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::criteria::ReportCriteria;
use super::error::ReportError;
use super::exporter::TabularExporter;
use super::filter::FilterBuilder;
use super::notifier::Notifier;
use super::reader::LedgerReader;
use super::store::{ArtifactStore, artifact_key};
use super::types::{DeliveryNotice, LedgerEntry, PipelineStage, ReportOutcome, ReportRequest};

/// Limits applied to report pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pipelines running at the same time.
    pub max_concurrent: usize,
    /// Pipelines queued or running before dispatch is refused.
    pub max_pending: usize,
    /// Artifact key strategy.
    pub key_strategy: KeyStrategy,
    /// Limit on the ledger query.
    pub query_timeout: Duration,
    /// Limit on spreadsheet serialization.
    pub export_timeout: Duration,
    /// Limit on the artifact upload.
    pub store_timeout: Duration,
    /// Limit on notification delivery.
    pub notify_timeout: Duration,
}

impl PipelineSettings {
    /// Settings from the `[reports]` configuration section.
    #[must_use]
    pub const fn from_config(config: &ReportsConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent,
            max_pending: config.max_pending,
            key_strategy: config.key_strategy,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            export_timeout: Duration::from_secs(config.export_timeout_secs),
            store_timeout: Duration::from_secs(config.store_timeout_secs),
            notify_timeout: Duration::from_secs(config.notify_timeout_secs),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&ReportsConfig::default())
    }
}

/// Why a request was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Too many pipelines are already queued or running.
    #[error("report queue is full ({pending} pending)")]
    Saturated {
        /// Pipelines pending when the request arrived.
        pending: usize,
    },
    /// The orchestrator no longer accepts work.
    #[error("report pipeline is shutting down")]
    ShuttingDown,
}

/// Handle returned for an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTicket {
    /// ID used in every log line of the run.
    pub report_id: ReportId,
}

/// Accepts report requests without waiting for them to finish.
pub trait ReportDispatcher: Send + Sync {
    /// Schedules `request` and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the request cannot be scheduled.
    fn dispatch(&self, request: ReportRequest) -> Result<ReportTicket, DispatchError>;

    /// Pipelines queued or running.
    fn pending(&self) -> usize;
}

/// Runs report pipelines on detached, tracked tasks.
///
/// Concurrency is bounded by a semaphore; requests beyond `max_pending` are
/// refused instead of queued. Each run is isolated: a panic or failure in one
/// is logged and never touches another.
pub struct ReportOrchestrator<R, S, N> {
    pipeline: Arc<Pipeline<R, S, N>>,
    permits: Arc<Semaphore>,
    /// One slot per queued or running pipeline, held until the task ends.
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl<R, S, N> ReportOrchestrator<R, S, N>
where
    R: LedgerReader + 'static,
    S: ArtifactStore + 'static,
    N: Notifier + 'static,
{
    /// Creates an orchestrator over the given stage implementations.
    #[must_use]
    pub fn new(reader: R, store: S, notifier: N, settings: PipelineSettings) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(settings.max_concurrent.max(1))),
            slots: Arc::new(Semaphore::new(settings.max_pending)),
            pipeline: Arc::new(Pipeline {
                reader,
                store,
                notifier,
                settings,
            }),
            tracker: TaskTracker::new(),
        }
    }

    /// Runs one pipeline to completion on the current task.
    pub async fn run(&self, report_id: ReportId, request: ReportRequest) -> ReportOutcome {
        self.pipeline.run(report_id, request).await
    }

    /// Stops accepting requests and waits for in-flight pipelines.
    pub async fn shutdown(&self) {
        self.tracker.close();
        info!(pending = self.tracker.len(), "Waiting for report pipelines");
        self.tracker.wait().await;
        info!("Report pipelines drained");
    }
}

impl<R, S, N> ReportDispatcher for ReportOrchestrator<R, S, N>
where
    R: LedgerReader + 'static,
    S: ArtifactStore + 'static,
    N: Notifier + 'static,
{
    fn dispatch(&self, request: ReportRequest) -> Result<ReportTicket, DispatchError> {
        if self.tracker.is_closed() {
            return Err(DispatchError::ShuttingDown);
        }
        let Ok(slot) = Arc::clone(&self.slots).try_acquire_owned() else {
            let pending = self.pending();
            warn!(pending, "Report queue full, refusing request");
            return Err(DispatchError::Saturated { pending });
        };

        let report_id = ReportId::new();
        let span = info_span!(
            "report_pipeline",
            report_id = %report_id,
            recipient = %request.recipient
        );
        let pipeline = Arc::clone(&self.pipeline);
        let permits = Arc::clone(&self.permits);

        self.tracker.spawn(
            async move {
                let _slot = slot;
                let Ok(_permit) = permits.acquire_owned().await else {
                    error!("Report permits closed, dropping request");
                    return;
                };
                let outcome = AssertUnwindSafe(pipeline.run(report_id, request))
                    .catch_unwind()
                    .await;
                record(outcome);
            }
            .instrument(span),
        );

        info!(report_id = %report_id, pending = self.pending(), "Report dispatched");
        Ok(ReportTicket { report_id })
    }

    fn pending(&self) -> usize {
        self.pipeline
            .settings
            .max_pending
            .saturating_sub(self.slots.available_permits())
    }
}

struct Pipeline<R, S, N> {
    reader: R,
    store: S,
    notifier: N,
    settings: PipelineSettings,
}

impl<R, S, N> Pipeline<R, S, N>
where
    R: LedgerReader,
    S: ArtifactStore,
    N: Notifier,
{
    async fn run(&self, report_id: ReportId, request: ReportRequest) -> ReportOutcome {
        debug!(stage = %PipelineStage::Received, "Report received");

        let rows = match self.query(&request.criteria).await {
            Ok(rows) => rows,
            Err(error) => return failed(PipelineStage::Queried, error),
        };
        debug!(stage = %PipelineStage::Queried, rows = rows.len(), "Ledger rows fetched");

        let bytes = match self.export(rows).await {
            Ok(bytes) => bytes,
            Err(error) => return failed(PipelineStage::Exported, error),
        };
        debug!(stage = %PipelineStage::Exported, bytes = bytes.len(), "Spreadsheet written");

        let key = artifact_key(self.settings.key_strategy, &request.recipient, report_id);
        let artifact = match within(
            self.settings.store_timeout,
            self.store.store(&key, bytes),
            ReportError::StoreWriteFailed,
        )
        .await
        {
            Ok(artifact) => artifact,
            Err(error) => return failed(PipelineStage::Stored, error),
        };
        debug!(stage = %PipelineStage::Stored, key = %artifact.key, "Artifact stored");

        let notice = DeliveryNotice {
            recipient: request.recipient,
            reference: artifact.reference.clone(),
            generated_at: Utc::now(),
        };
        match within(
            self.settings.notify_timeout,
            self.notifier.notify(&notice),
            ReportError::NotificationFailed,
        )
        .await
        {
            Ok(receipt) => ReportOutcome::Completed { artifact, receipt },
            Err(error) => ReportOutcome::Failed {
                stage: PipelineStage::Notified,
                error,
                artifact: Some(artifact),
            },
        }
    }

    async fn query(&self, criteria: &ReportCriteria) -> Result<Vec<LedgerEntry>, ReportError> {
        let predicate = FilterBuilder::build(criteria)?;
        within(
            self.settings.query_timeout,
            self.reader.fetch(&predicate),
            ReportError::QueryFailed,
        )
        .await
    }

    async fn export(&self, rows: Vec<LedgerEntry>) -> Result<Vec<u8>, ReportError> {
        let task = tokio::task::spawn_blocking(move || TabularExporter::export(&rows));
        within(
            self.settings.export_timeout,
            async {
                match task.await {
                    Ok(result) => result,
                    Err(e) => Err(ReportError::serialization_failed(format!(
                        "export task failed: {e}"
                    ))),
                }
            },
            ReportError::SerializationFailed,
        )
        .await
    }
}

fn failed(stage: PipelineStage, error: ReportError) -> ReportOutcome {
    ReportOutcome::Failed {
        stage,
        error,
        artifact: None,
    }
}

/// Awaits `future`, turning an elapsed `limit` into the stage's own error.
async fn within<T>(
    limit: Duration,
    future: impl Future<Output = Result<T, ReportError>>,
    on_timeout: fn(String) -> ReportError,
) -> Result<T, ReportError> {
    tokio::time::timeout(limit, future)
        .await
        .unwrap_or_else(|_| Err(on_timeout(format!("timed out after {limit:?}"))))
}

fn record(outcome: Result<ReportOutcome, Box<dyn Any + Send>>) {
    match outcome {
        Ok(ReportOutcome::Completed { artifact, receipt }) => info!(
            key = %artifact.key,
            size = artifact.size,
            delivered_at = %receipt.delivered_at,
            "Report delivered"
        ),
        Ok(ReportOutcome::Failed {
            stage,
            error,
            artifact: Some(artifact),
        }) => error!(
            stage = %stage,
            key = %artifact.key,
            reference = %artifact.reference,
            error = %error,
            "Report stored but notification failed"
        ),
        Ok(ReportOutcome::Failed {
            stage,
            error,
            artifact: None,
        }) => error!(stage = %stage, error = %error, "Report pipeline failed"),
        Err(panic) => error!(panic = panic_message(&*panic), "Report pipeline panicked"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = ReportsConfig {
            max_concurrent: 2,
            query_timeout_secs: 5,
            key_strategy: KeyStrategy::Latest,
            ..ReportsConfig::default()
        };
        let settings = PipelineSettings::from_config(&config);

        assert_eq!(settings.max_concurrent, 2);
        assert_eq!(settings.max_pending, 256);
        assert_eq!(settings.query_timeout, Duration::from_secs(5));
        assert_eq!(settings.notify_timeout, Duration::from_secs(60));
        assert_eq!(settings.key_strategy, KeyStrategy::Latest);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*boxed), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*boxed), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(&*boxed), "non-string panic payload");
    }

    #[tokio::test]
    async fn test_within_maps_timeout_to_stage_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ReportError>(())
        };
        let err = within(Duration::from_millis(10), slow, ReportError::QueryFailed)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::QueryFailed(msg) if msg.contains("timed out")));
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(
            DispatchError::Saturated { pending: 3 }.to_string(),
            "report queue is full (3 pending)"
        );
        assert_eq!(
            DispatchError::ShuttingDown.to_string(),
            "report pipeline is shutting down"
        );
    }
}
