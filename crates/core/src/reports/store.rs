//! Artifact persistence.

use std::future::Future;

use tally_shared::KeyStrategy;
use tally_shared::types::ReportId;

use super::error::ReportError;
use super::types::ReportArtifact;
use crate::storage::StorageService;

/// Persists report bytes and returns a retrieval reference.
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under `key`, replacing any previous object.
    ///
    /// On success the artifact is durable and the reference resolves to it.
    fn store(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<ReportArtifact, ReportError>> + Send;
}

impl ArtifactStore for StorageService {
    async fn store(&self, key: &str, bytes: Vec<u8>) -> Result<ReportArtifact, ReportError> {
        let size = self.put(key, bytes).await?;
        let reference = self.retrieval_url(key).await?;
        Ok(ReportArtifact {
            key: key.to_string(),
            reference,
            size,
        })
    }
}

/// Storage key for a report.
///
/// `reports/{recipient}/{report_id}.xlsx` keeps every request apart;
/// [`KeyStrategy::Latest`] uses `reports/{recipient}/report.xlsx` so a new
/// report replaces the recipient's previous one.
#[must_use]
pub fn artifact_key(strategy: KeyStrategy, recipient: &str, report_id: ReportId) -> String {
    let recipient = sanitize_segment(recipient);
    match strategy {
        KeyStrategy::PerRequest => format!("reports/{recipient}/{report_id}.xlsx"),
        KeyStrategy::Latest => format!("reports/{recipient}/report.xlsx"),
    }
}

/// Maps a recipient address to a single safe path segment.
///
/// Keeps ASCII alphanumerics and `.`, `-`, `_`, `@`, `+`; everything else
/// becomes `_`. A segment made only of dots is replaced too.
fn sanitize_segment(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        "_".repeat(sanitized.len().max(1))
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageProvider};
    use proptest::prelude::*;

    #[test]
    fn test_per_request_key_contains_report_id() {
        let id = ReportId::new();
        assert_eq!(
            artifact_key(KeyStrategy::PerRequest, "alice@example.com", id),
            format!("reports/alice@example.com/{id}.xlsx")
        );
    }

    #[test]
    fn test_latest_key_is_stable_per_recipient() {
        let first = artifact_key(KeyStrategy::Latest, "alice@example.com", ReportId::new());
        let second = artifact_key(KeyStrategy::Latest, "alice@example.com", ReportId::new());
        assert_eq!(first, "reports/alice@example.com/report.xlsx");
        assert_eq!(first, second);
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("bob+ops@example.com"), "bob+ops@example.com");
        assert_eq!(sanitize_segment("a/b c@x.io"), "a_b_c@x.io");
        assert_eq!(sanitize_segment(".."), "__");
        assert_eq!(sanitize_segment(""), "_");
    }

    #[tokio::test]
    async fn test_storage_service_stores_artifact() {
        let service = StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("memory storage");

        let artifact = service
            .store("reports/a@b.io/report.xlsx", b"PK".to_vec())
            .await
            .expect("store should succeed");

        assert_eq!(artifact.key, "reports/a@b.io/report.xlsx");
        assert_eq!(artifact.reference, "memory:///reports/a@b.io/report.xlsx");
        assert_eq!(artifact.size, 2);
        assert!(service.exists(&artifact.key).await);
    }

    #[tokio::test]
    async fn test_invalid_key_maps_to_store_write_failed() {
        let service = StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("memory storage");

        let err = service.store("/abs.xlsx", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ReportError::StoreWriteFailed(_)));
    }

    proptest! {
        #[test]
        fn prop_key_has_three_segments(recipient in ".*") {
            let key = artifact_key(KeyStrategy::PerRequest, &recipient, ReportId::new());
            let parts: Vec<&str> = key.split('/').collect();

            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], "reports");
            prop_assert!(parts[1] != "." && parts[1] != ".." && !parts[1].is_empty());
        }
    }
}
