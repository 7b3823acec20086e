//! Unit tests for the template mailer

use std::collections::HashMap;

use cms_core::domain::entities::{EmailFormat, User};
use cms_core::services::account::{EmailKey, Mailer};
use cms_shared::EmailConfig;

use crate::email::{create_email_service, EmailTemplate, MockEmailService, TemplateMailer, TemplateSet};

fn link(value: &str) -> HashMap<String, String> {
    HashMap::from([("link".to_string(), value.to_string())])
}

fn mailer() -> TemplateMailer<MockEmailService> {
    TemplateMailer::new(MockEmailService::new(), EmailConfig::default())
}

#[tokio::test]
async fn test_verify_email_is_rendered_as_text() {
    let mailer = mailer();
    let mut user = User::new("jane", "jane@example.com");
    user.first_name = Some("Jane".to_string());

    mailer
        .send_email_by_key(&user, EmailKey::VerifyEmail, &link("https://cms.test/verify?code=abc"))
        .await
        .unwrap();

    let sent = mailer.service().last_message().unwrap();
    assert_eq!(sent.to, "jane@example.com");
    assert_eq!(sent.from, "CMS <no-reply@localhost>");
    assert_eq!(sent.subject, "Verify your email address");
    assert!(!sent.html);
    assert!(sent.body.starts_with("Hey Jane,"));
    assert!(sent.body.contains("https://cms.test/verify?code=abc"));
}

#[tokio::test]
async fn test_html_preference_selects_html_body() {
    let mailer = mailer();
    let mut user = User::new("jane", "jane@example.com");
    user.email_format = EmailFormat::Html;

    mailer
        .send_email_by_key(&user, EmailKey::ForgotPassword, &link("https://cms.test/r"))
        .await
        .unwrap();

    let sent = mailer.service().last_message().unwrap();
    assert!(sent.html);
    assert!(sent.body.contains("<a href=\"https://cms.test/r\">"));
    assert!(sent.body.contains("password for jane"));
}

#[tokio::test]
async fn test_caller_variables_override_user_context() {
    let mailer = mailer().with_templates(
        TemplateSet::default()
            .with_template(EmailKey::VerifyEmail, EmailTemplate::new("{{name}}", "{{link}}", "")),
    );
    let user = User::new("jane", "jane@example.com");
    let mut variables = link("L");
    variables.insert("name".to_string(), "Override".to_string());

    mailer
        .send_email_by_key(&user, EmailKey::VerifyEmail, &variables)
        .await
        .unwrap();

    let sent = mailer.service().last_message().unwrap();
    assert_eq!(sent.subject, "Override");
    assert_eq!(sent.body, "L");
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let mailer = TemplateMailer::new(MockEmailService::failing(), EmailConfig::default());
    let user = User::new("jane", "jane@example.com");

    let result = mailer
        .send_email_by_key(&user, EmailKey::VerifyEmail, &link("L"))
        .await;

    assert!(result.unwrap_err().contains("Simulated"));
}

#[test]
fn test_unknown_transport_is_rejected() {
    let config = EmailConfig {
        transport: "carrier-pigeon".to_string(),
        ..EmailConfig::default()
    };

    assert!(create_email_service(&config).is_err());
    assert!(create_email_service(&EmailConfig::default()).is_ok());
}
