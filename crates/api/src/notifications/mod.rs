//! Fire-and-forget mail dispatch.
//!
//! Handlers call [`schedule`] after their transaction commits. Delivery runs
//! on its own task; failures are logged and never reach the response.

use std::sync::Arc;

use hrm_events::{MailMessage, MailTemplate, NotificationSink};

/// Spawn delivery of `message` on the runtime.
pub fn schedule(notifier: &Arc<dyn NotificationSink>, message: MailMessage) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        let template = message.template;
        let recipients = message.recipients.clone();
        if let Err(e) = notifier.send(message).await {
            tracing::warn!(
                error = %e,
                to = ?recipients,
                template = template.file_name(),
                "Failed to send mail"
            );
        }
    });
}

/// Schedule one token mail addressed to a single employee.
pub fn schedule_token_mail(
    notifier: &Arc<dyn NotificationSink>,
    template: MailTemplate,
    email: &str,
    name: &str,
    token: &str,
) {
    schedule(notifier, MailMessage::with_token(template, email, name, token));
}
