//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Object storage configuration for report artifacts.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Report pipeline tuning.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Transport security used when talking to the SMTP relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    Starttls,
    /// Implicit TLS (port 465).
    Tls,
    /// No encryption. Local relays such as Mailpit only.
    None,
}

/// SMTP configuration for outbound email.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username. Empty means no authentication.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Transport security.
    #[serde(default)]
    pub security: SmtpSecurity,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            security: SmtpSecurity::default(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_email() -> String {
    "reports@localhost".to_string()
}

fn default_from_name() -> String {
    "Tally Reports".to_string()
}

/// Object storage backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// S3-compatible storage.
    S3,
    /// Azure Blob Storage.
    AzureBlob,
    /// Local filesystem (development only).
    #[default]
    LocalFs,
    /// In-process memory (tests only).
    Memory,
}

/// Object storage settings as they appear in configuration files.
///
/// Only the fields relevant to `provider` are read.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend kind.
    #[serde(default)]
    pub provider: StorageKind,
    /// S3 endpoint URL.
    pub endpoint: Option<String>,
    /// S3 bucket name.
    pub bucket: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// S3 access key ID.
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    pub secret_access_key: Option<String>,
    /// Azure storage account name.
    pub account: Option<String>,
    /// Azure storage access key.
    pub access_key: Option<String>,
    /// Azure container name.
    pub container: Option<String>,
    /// Root directory for the local filesystem backend.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Base URL used to build links when the backend cannot presign.
    pub public_base_url: Option<String>,
    /// Lifetime of presigned download links, in seconds.
    #[serde(default = "default_download_ttl")]
    pub download_ttl_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageKind::default(),
            endpoint: None,
            bucket: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            account: None,
            access_key: None,
            container: None,
            root: default_storage_root(),
            public_base_url: None,
            download_ttl_secs: default_download_ttl(),
        }
    }
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_download_ttl() -> u64 {
    604_800 // 7 days
}

/// How artifact keys are discriminated between repeated requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// `reports/{recipient}/{report_id}.xlsx`, one artifact per request.
    #[default]
    PerRequest,
    /// `reports/{recipient}/report.xlsx`, each request overwrites the last.
    Latest,
}

/// Report pipeline tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Pipelines allowed to run at the same time.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Pipelines allowed to be queued or running before dispatch is refused.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// Rows fetched per ledger page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Artifact key strategy.
    #[serde(default)]
    pub key_strategy: KeyStrategy,
    /// Ledger query timeout in seconds.
    #[serde(default = "default_stage_timeout")]
    pub query_timeout_secs: u64,
    /// Spreadsheet export timeout in seconds.
    #[serde(default = "default_stage_timeout")]
    pub export_timeout_secs: u64,
    /// Artifact upload timeout in seconds.
    #[serde(default = "default_stage_timeout")]
    pub store_timeout_secs: u64,
    /// Email delivery timeout in seconds.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            max_pending: default_max_pending(),
            page_size: default_page_size(),
            key_strategy: KeyStrategy::default(),
            query_timeout_secs: default_stage_timeout(),
            export_timeout_secs: default_stage_timeout(),
            store_timeout_secs: default_stage_timeout(),
            notify_timeout_secs: default_notify_timeout(),
        }
    }
}

fn default_max_concurrent() -> usize {
    8
}

fn default_max_pending() -> usize {
    256
}

fn default_page_size() -> u64 {
    1000
}

fn default_stage_timeout() -> u64 {
    120
}

fn default_notify_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
