// Notifications - best-effort email delivery fed by domain events
pub mod dispatcher;
pub mod events;
pub mod mailer;
pub mod templates;

pub use dispatcher::{DispatchReport, NotificationDispatcher, Recipient};
pub use events::{EventSink, HelpdeskEvent, NotificationKind};
pub use mailer::{
    build_transport, DeliveryError, LogOnlyMailTransport, MailTransport, OutgoingMail,
    SmtpMailTransport,
};
pub use templates::{NotificationContext, RenderedMail};
