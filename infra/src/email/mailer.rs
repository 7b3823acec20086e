//! Template mailer
//!
//! Adapts a mail transport to the account service [`Mailer`] trait by
//! rendering the template registered for each [`EmailKey`].

use async_trait::async_trait;
use std::collections::HashMap;

use cms_core::domain::entities::{EmailFormat, User};
use cms_core::services::account::{EmailKey, Mailer};
use cms_shared::EmailConfig;

use super::email_service::{mask_email, EmailMessage, EmailService};
use super::templates::{render, TemplateSet};

/// Renders account emails and hands them to an [`EmailService`]
pub struct TemplateMailer<S: EmailService> {
    service: S,
    config: EmailConfig,
    templates: TemplateSet,
}

impl<S: EmailService> TemplateMailer<S> {
    pub fn new(service: S, config: EmailConfig) -> Self {
        Self {
            service,
            config,
            templates: TemplateSet::default(),
        }
    }

    /// Use a custom template set
    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    /// The underlying transport
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Render the message for `user` without sending it
    pub fn compose(
        &self,
        user: &User,
        key: EmailKey,
        variables: &HashMap<String, String>,
    ) -> Result<EmailMessage, String> {
        let template = self
            .templates
            .get(key)
            .ok_or_else(|| format!("No email template for key '{}'", key))?;

        let mut context = HashMap::from([
            ("username".to_string(), user.username.clone()),
            ("name".to_string(), user.name()),
            ("email".to_string(), user.email.clone()),
            (
                "first_name".to_string(),
                user.first_name.clone().unwrap_or_default(),
            ),
        ]);
        context.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));

        let html = user.email_format == EmailFormat::Html;
        let body = if html {
            &template.html_body
        } else {
            &template.text_body
        };

        Ok(EmailMessage {
            to: user.email.clone(),
            to_name: user.name(),
            from: self.config.sender(),
            subject: render(&template.subject, &context),
            body: render(body, &context),
            html,
        })
    }
}

#[async_trait]
impl<S: EmailService> Mailer for TemplateMailer<S> {
    async fn send_email_by_key(
        &self,
        user: &User,
        key: EmailKey,
        variables: &HashMap<String, String>,
    ) -> Result<(), String> {
        let message = self.compose(user, key, variables)?;

        match self.service.send_email(&message).await {
            Ok(message_id) => {
                tracing::info!(
                    user_id = %user.id,
                    template = %key,
                    message_id = %message_id,
                    provider = self.service.provider_name(),
                    "Account email sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user.id,
                    template = %key,
                    to = %mask_email(&message.to),
                    error = %e,
                    "Failed to send account email"
                );
                Err(e.to_string())
            }
        }
    }
}
