pub mod mailer;
pub mod templates;

pub use mailer::{EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer, mailer_from_config};
