//! Default account email templates
//!
//! Placeholders use `{{name}}` syntax. Unknown placeholders are left as-is.

use std::collections::HashMap;

use cms_core::services::account::EmailKey;

/// Subject and bodies for one email key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl EmailTemplate {
    pub fn new(
        subject: impl Into<String>,
        text_body: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: html_body.into(),
        }
    }
}

/// Templates indexed by email key
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<EmailKey, EmailTemplate>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            EmailKey::VerifyEmail,
            EmailTemplate::new(
                "Verify your email address",
                "Hey {{name}},\n\n\
                 Please verify your email address by visiting the link below:\n\n\
                 {{link}}\n",
                "<p>Hey {{name}},</p>\
                 <p>Please verify your email address by visiting the link below:</p>\
                 <p><a href=\"{{link}}\">{{link}}</a></p>",
            ),
        );
        templates.insert(
            EmailKey::ForgotPassword,
            EmailTemplate::new(
                "Reset your password",
                "Hey {{name}},\n\n\
                 To reset the password for {{username}}, visit the link below:\n\n\
                 {{link}}\n\n\
                 If you did not request this, you can ignore this email.\n",
                "<p>Hey {{name}},</p>\
                 <p>To reset the password for {{username}}, visit the link below:</p>\
                 <p><a href=\"{{link}}\">{{link}}</a></p>\
                 <p>If you did not request this, you can ignore this email.</p>",
            ),
        );
        Self { templates }
    }
}

impl TemplateSet {
    pub fn get(&self, key: EmailKey) -> Option<&EmailTemplate> {
        self.templates.get(&key)
    }

    /// Replace the template for `key`
    pub fn with_template(mut self, key: EmailKey, template: EmailTemplate) -> Self {
        self.templates.insert(key, template);
        self
    }
}

/// Substitute `{{name}}` placeholders from `variables`
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match variables.get(name) {
                    Some(value) => output.push_str(value),
                    None => output.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}
