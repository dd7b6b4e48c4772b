//! The notification seam between request handlers and mail delivery.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::delivery::email::EmailError;
use crate::templates::MailTemplate;

/// One templated mail to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub recipients: Vec<String>,
    pub template: MailTemplate,
    pub variables: BTreeMap<String, String>,
}

impl MailMessage {
    /// Mail addressed to one employee carrying their name and a token.
    pub fn with_token(template: MailTemplate, to: &str, name: &str, token: &str) -> Self {
        let variables = [("name", name), ("token", token)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            recipients: vec![to.to_string()],
            template,
            variables,
        }
    }

    pub fn subject(&self) -> &'static str {
        self.template.subject()
    }
}

/// Anything that can deliver a [`MailMessage`].
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), EmailError>;
}

/// Sink used when SMTP is not configured: logs and drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlySink;

#[async_trait]
impl NotificationSink for LogOnlySink {
    async fn send(&self, message: MailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = ?message.recipients,
            subject = message.subject(),
            template = message.template.file_name(),
            "SMTP not configured, mail not sent"
        );
        Ok(())
    }
}
