//! Application-wide error types.

use thiserror::Error;

/// Errors surfaced synchronously to HTTP callers.
///
/// Pipeline failures never reach this type; they happen after the response
/// has been sent and are only logged.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Well-formed request whose filter criteria cannot be satisfied.
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    /// The service cannot accept work right now.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidCriteria(_) => 422,
            Self::Unavailable(_) => 503,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidCriteria(_) => "INVALID_CRITERIA",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::InvalidCriteria(String::new()).status_code(), 422);
        assert_eq!(AppError::Unavailable(String::new()).status_code(), 503);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::InvalidCriteria(String::new()).error_code(),
            "INVALID_CRITERIA"
        );
        assert_eq!(
            AppError::Unavailable(String::new()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::InvalidCriteria("msg".into()).to_string(),
            "Invalid criteria: msg"
        );
        assert_eq!(
            AppError::Unavailable("msg".into()).to_string(),
            "Service unavailable: msg"
        );
    }
}
