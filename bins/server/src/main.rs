//! Tally API Server
//!
//! Main entry point for the Tally report service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, create_router};
use tally_core::reports::{EmailNotifier, PipelineSettings, ReportOrchestrator};
use tally_core::storage::{StorageConfig, StorageService};
use tally_db::{LedgerRepository, connect_with};
use tally_shared::{AppConfig, EmailService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");
    let ledger = LedgerRepository::new(db).with_page_size(config.reports.page_size);

    // Object storage for report artifacts
    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage)?)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage configured"
    );

    // Create email service
    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let settings = PipelineSettings::from_config(&config.reports);
    info!(
        max_concurrent = settings.max_concurrent,
        max_pending = settings.max_pending,
        key_strategy = ?settings.key_strategy,
        "Report pipeline configured"
    );
    let orchestrator = Arc::new(ReportOrchestrator::new(
        ledger,
        storage,
        EmailNotifier::new(email_service),
        settings,
    ));

    // Create router
    let app = create_router(AppState::new(orchestrator.clone()));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight reports finish before exiting
    orchestrator.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
