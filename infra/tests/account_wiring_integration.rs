//! Integration tests wiring the account service to the infra adapters

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use secrecy::SecretString;

use cms_core::domain::entities::User;
use cms_core::errors::{AccountError, DomainError};
use cms_core::repositories::MockUserRepository;
use cms_core::services::account::{
    AccountService, AccountServiceConfig, ManualClock, PasswordHasher,
};
use cms_infra::email::{MockEmailService, TemplateMailer};
use cms_infra::security::{BcryptPasswordHasher, BCRYPT_ALGORITHM};
use cms_infra::url::SiteUrlBuilder;
use cms_shared::{AccountConfig, EmailConfig};

type Service = AccountService<MockUserRepository, BcryptPasswordHasher, TemplateMailer<MockEmailService>>;

fn service_with(transport: MockEmailService) -> Service {
    let config = AccountConfig {
        site_url: "https://cms.example.org/".to_string(),
        ..AccountConfig::default()
    };

    AccountService::new(
        Arc::new(MockUserRepository::new()),
        Arc::new(BcryptPasswordHasher::new(4)),
        Arc::new(TemplateMailer::new(transport, EmailConfig::default())),
        Arc::new(SiteUrlBuilder::new(&config.site_url).unwrap()),
        AccountServiceConfig::new(config),
    )
    .with_clock(Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )))
}

#[tokio::test]
async fn test_registration_sends_rendered_verification_email() {
    let transport = MockEmailService::new();
    let service = service_with(transport.clone());

    let mut user = User::new("jane", "jane@example.com");
    user.new_password = Some(SecretString::new("correct horse".to_string()));
    user.verification_required = true;

    assert!(service.save_user(&mut user).await.unwrap());

    let code = user.verification_code().unwrap().to_string();
    let sent = transport.last_message().unwrap();
    assert_eq!(sent.to, "jane@example.com");
    assert!(sent
        .body
        .contains(&format!("https://cms.example.org/verify?code={}", code)));
}

#[tokio::test]
async fn test_password_is_stored_as_bcrypt_hash() {
    let service = service_with(MockEmailService::new());

    let mut user = User::new("jane", "jane@example.com");
    user.new_password = Some(SecretString::new("correct horse".to_string()));
    assert!(service.save_user(&mut user).await.unwrap());

    let hash = user.password_hash.clone().unwrap();
    assert_eq!(user.hash_algorithm.as_deref(), Some(BCRYPT_ALGORITHM));
    assert!(BcryptPasswordHasher::new(4)
        .verify_password("correct horse", &hash)
        .unwrap());
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_mail_delivery_error() {
    let service = service_with(MockEmailService::failing());

    let mut user = User::new("jane", "jane@example.com");
    assert!(service.save_user(&mut user).await.unwrap());

    let err = service
        .send_forgot_password_email(&mut user)
        .await
        .unwrap_err();

    match err {
        DomainError::Account(AccountError::MailDelivery { template, .. }) => {
            assert_eq!(template, "forgot_password");
        }
        other => panic!("Expected MailDelivery, got {:?}", other),
    }
}
