//! Outbound notifications for the HR backend.
//!
//! - [`MailTemplate`]: the HTML mails the backend sends and their subjects.
//! - [`NotificationSink`]: the async seam handlers send through.
//! - [`EmailDelivery`]: SMTP implementation of the sink.
//! - [`LogOnlySink`]: fallback when SMTP is not configured.

pub mod delivery;
pub mod sink;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use sink::{LogOnlySink, MailMessage, NotificationSink};
pub use templates::MailTemplate;
