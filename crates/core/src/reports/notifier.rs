//! Recipient notification.

use std::future::Future;

use chrono::Utc;
use tally_shared::EmailService;

use super::error::ReportError;
use super::types::{DeliveryNotice, DeliveryReceipt};

/// Subject line of every report email.
pub const REPORT_READY_SUBJECT: &str = "Your Report is Ready";

/// Delivers a retrieval reference to a recipient.
pub trait Notifier: Send + Sync {
    /// Sends one notice. Success means the outbound channel accepted it,
    /// not that the recipient read it.
    fn notify(
        &self,
        notice: &DeliveryNotice,
    ) -> impl Future<Output = Result<DeliveryReceipt, ReportError>> + Send;
}

/// Notifier that sends plain-text email over SMTP.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    email: EmailService,
}

impl EmailNotifier {
    /// Wraps an email service.
    #[must_use]
    pub const fn new(email: EmailService) -> Self {
        Self { email }
    }

    /// Subject and body for `notice`.
    #[must_use]
    pub fn compose(notice: &DeliveryNotice) -> (&'static str, String) {
        let body = format!(
            "Your report is ready for download. Click the link below to download it:\n\n\
             {}\n\n\
             Generated at {} UTC.",
            notice.reference,
            notice.generated_at.format("%Y-%m-%d %H:%M:%S"),
        );
        (REPORT_READY_SUBJECT, body)
    }
}

impl Notifier for EmailNotifier {
    async fn notify(&self, notice: &DeliveryNotice) -> Result<DeliveryReceipt, ReportError> {
        let (subject, body) = Self::compose(notice);
        self.email
            .send_email(&notice.recipient, subject, &body)
            .await?;

        Ok(DeliveryReceipt {
            recipient: notice.recipient.clone(),
            delivered_at: Utc::now(),
        })
    }
}
