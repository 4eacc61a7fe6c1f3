//! Report generation routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tally_core::reports::{DateRange, ReportCriteria, ReportRequest};
use tally_shared::AppError;
use tally_shared::types::ReportId;
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;

/// Message returned with every accepted request.
pub const ACCEPTED_MESSAGE: &str = "The report generation has been started. \
     You will receive an email with a download link when the report is ready.";

/// Body of `POST /generate_report`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportRequest {
    /// Recipient of the download link.
    #[garde(email)]
    pub email: String,
    /// Inclusive `[start, end]` timestamps.
    #[garde(skip)]
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Only rows of this user.
    #[garde(skip)]
    pub user_email: Option<String>,
    /// Only rows recorded by this admin.
    #[garde(skip)]
    pub admin: Option<String>,
    /// Only rows with this status.
    #[garde(skip)]
    pub status: Option<String>,
    /// Only rows of this transaction type.
    #[garde(skip)]
    pub transaction_type: Option<String>,
    /// Only rows referring to this original transaction.
    #[garde(skip)]
    pub original_id: Option<String>,
}

impl From<GenerateReportRequest> for ReportRequest {
    fn from(body: GenerateReportRequest) -> Self {
        let criteria = ReportCriteria {
            date_range: body
                .date_range
                .map(|(start, end)| DateRange::new(start, end)),
            user_email: body.user_email,
            admin: body.admin,
            status: body.status,
            transaction_type: body.transaction_type,
            original_id: body.original_id,
        };
        Self::new(body.email, criteria.without_blanks())
    }
}

/// Body of a `202 Accepted` answer.
#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
    /// ID to quote when asking operators about this report.
    pub report_id: ReportId,
}

/// Creates the report router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/generate_report", post(generate_report))
}

/// POST /generate_report - Schedule a report and return immediately.
///
/// The pipeline outcome is never part of the response.
async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<GenerateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateReportResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = ReportRequest::from(payload);
    request
        .criteria
        .validate()
        .map_err(|e| AppError::InvalidCriteria(e.to_string()))?;

    let ticket = state.reports.dispatch(request).map_err(|e| {
        warn!(error = %e, "Report request refused");
        AppError::Unavailable(e.to_string())
    })?;

    info!(report_id = %ticket.report_id, "Report generation accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateReportResponse {
            message: ACCEPTED_MESSAGE,
            report_id: ticket.report_id,
        }),
    ))
}
