use std::sync::Arc;

use async_trait::async_trait;
use derive_more::Display;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use crate::settings::AppConfig;

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Display)]
pub enum EmailError {
    #[display("Invalid address: {_0}")]
    InvalidAddress(String),

    #[display("Failed to build message: {_0}")]
    Build(String),

    #[display("SMTP delivery failed: {_0}")]
    Transport(String),
}

impl std::error::Error for EmailError {}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Records what would have been sent. Used outside production when no SMTP
/// host is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        info!(to = %email.to, subject = %email.subject, "Email not dispatched (log-only mailer)");
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &AppConfig) -> Result<Self, EmailError> {
        let host = config
            .email_host
            .as_deref()
            .ok_or_else(|| EmailError::Build("APP_EMAIL_HOST is not set".into()))?;

        // Implicit TLS when `secure`, STARTTLS upgrade otherwise.
        let builder = if config.email_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| EmailError::Build(e.to_string()))?
        .port(config.email_port);

        let builder = match (&config.email_user, &config.email_pass) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        let from = config
            .email_from
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(config.email_from.clone()))?;

        Ok(SmtpMailer { transport: builder.build(), from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Picks the mailer for the running environment. An SMTP setup that cannot
/// be built degrades to logging, since mail never blocks a submission.
pub fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    if config.uses_log_mailer() {
        info!("No SMTP host configured, contact emails will only be logged");
        return Arc::new(LogMailer);
    }

    match SmtpMailer::from_config(config) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            warn!(error = %e, "SMTP mailer unavailable, falling back to log-only mailer");
            Arc::new(LogMailer)
        }
    }
}
