//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tally_shared::{StorageKind, StorageSettings};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests only)
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }

    /// Public location of `key` for backends that cannot presign.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        match self {
            Self::S3 {
                endpoint, bucket, ..
            } => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
            Self::AzureBlob {
                account, container, ..
            } => format!("https://{account}.blob.core.windows.net/{container}/{key}"),
            Self::LocalFs { root } => {
                format!("file://{}/{key}", root.display().to_string().trim_end_matches('/'))
            }
            Self::Memory => format!("memory:///{key}"),
        }
    }
}

fn required(value: Option<&String>, field: &str) -> Result<String, StorageError> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| StorageError::configuration(format!("storage.{field} is required")))
}

impl TryFrom<&StorageSettings> for StorageProvider {
    type Error = StorageError;

    fn try_from(settings: &StorageSettings) -> Result<Self, Self::Error> {
        match settings.provider {
            StorageKind::S3 => Ok(Self::s3(
                required(settings.endpoint.as_ref(), "endpoint")?,
                required(settings.bucket.as_ref(), "bucket")?,
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                settings.region.clone().unwrap_or_else(|| "auto".to_string()),
            )),
            StorageKind::AzureBlob => Ok(Self::azure_blob(
                required(settings.account.as_ref(), "account")?,
                required(settings.access_key.as_ref(), "access_key")?,
                required(settings.container.as_ref(), "container")?,
            )),
            StorageKind::LocalFs => Ok(Self::local_fs(&settings.root)),
            StorageKind::Memory => Ok(Self::Memory),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Presigned download URL TTL in seconds (default: 604800 = 7 days).
    pub presign_download_ttl_secs: u64,
    /// Overrides the provider-derived public URL when presigning is unavailable.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Default download TTL: 7 days, the longest S3 SigV4 allows.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 604_800;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            presign_download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
            public_base_url: None,
        }
    }

    /// Build the config from the application settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a field required by the selected provider is missing.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let mut config = Self::new(StorageProvider::try_from(settings)?)
            .with_download_ttl(settings.download_ttl_secs);
        config.public_base_url.clone_from(&settings.public_base_url);
        Ok(config)
    }

    /// Set presigned download URL TTL.
    #[must_use]
    pub fn with_download_ttl(mut self, secs: u64) -> Self {
        self.presign_download_ttl_secs = secs;
        self
    }

    /// Set the base URL used for unsigned links.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Unsigned link to `key`, preferring the configured base URL.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{key}", base.trim_end_matches('/')),
            None => self.provider.public_url(key),
        }
    }
}
