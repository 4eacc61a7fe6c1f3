use super::*;

fn service() -> EmailService {
    EmailService::new(EmailConfig {
        from_email: "reports@example.com".to_string(),
        from_name: "Reports".to_string(),
        ..EmailConfig::default()
    })
}

#[test]
fn test_email_config_default() {
    let config = EmailConfig::default();
    assert_eq!(config.smtp_host, "localhost");
    assert_eq!(config.smtp_port, 587);
    assert_eq!(config.security, SmtpSecurity::Starttls);
}

#[test]
fn test_new_email_service() {
    let config = EmailConfig::default();
    let service = EmailService::new(config.clone());
    assert_eq!(service.config.smtp_host, config.smtp_host);
}

#[tokio::test]
async fn test_create_transport_for_each_security_mode() {
    for security in [SmtpSecurity::None, SmtpSecurity::Starttls, SmtpSecurity::Tls] {
        let service = EmailService::new(EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "password".to_string(),
            security,
            ..EmailConfig::default()
        });
        assert!(service.create_transport().is_ok(), "{security:?}");
    }
}

#[test]
fn test_build_message_contains_subject_and_body() {
    let message = service()
        .build_message(
            "alice@example.com",
            "Your Report is Ready",
            "https://bucket.example.com/reports/alice.xlsx",
        )
        .expect("message should build");

    let raw = String::from_utf8(message.formatted()).expect("utf-8 message");
    assert!(raw.contains("Subject: Your Report is Ready"));
    assert!(raw.contains("To: alice@example.com"));
    assert!(raw.contains("https://bucket.example.com/reports/alice.xlsx"));
}

#[test]
fn test_build_message_rejects_invalid_recipient() {
    let err = service()
        .build_message("not-an-address", "subject", "body")
        .unwrap_err();
    assert!(matches!(err, EmailError::InvalidAddress(_)));
}

#[test]
fn test_email_error_display() {
    assert_eq!(
        format!("{}", EmailError::BuildError("msg".into())),
        "Failed to build email: msg"
    );
    assert_eq!(
        format!("{}", EmailError::SendError("msg".into())),
        "Failed to send email: msg"
    );
    assert_eq!(
        format!("{}", EmailError::InvalidAddress("msg".into())),
        "Invalid email address: msg"
    );
}
