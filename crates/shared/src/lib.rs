//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed IDs for report references
//! - Application-wide error types
//! - Configuration management
//! - SMTP email transport

pub mod config;
pub mod email;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, DatabaseConfig, EmailConfig, KeyStrategy, ReportsConfig, ServerConfig,
    SmtpSecurity, StorageKind, StorageSettings,
};
pub use email::{EmailError, EmailService};
pub use error::AppError;
