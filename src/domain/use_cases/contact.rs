use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    entities::{
        contact::{
            ContactForm, ContactListQuery, ContactMessage, ContactPatch, ContactStats, ContactStatus,
            ContactSubmission, SubmissionReceipt,
        },
        pagination::Paginated,
    },
    errors::AppError,
    infrastructure::{
        email::{templates, Mailer, OutgoingEmail},
        limiter::{RateDecision, SubmissionLimiter},
    },
    repositories::contact::ContactRepository,
    utils::valid_uuid::valid_uuid,
};

const NOT_FOUND: &str = "Contact message not found";

/// Addressing used for the two notification emails.
#[derive(Debug, Clone)]
pub struct ContactEmailSettings {
    pub admin_email: String,
    pub owner_name: String,
}

pub struct ContactHandler<R>
where
    R: ContactRepository + ?Sized,
{
    pub contact_repo: Arc<R>,
    pub mailer: Arc<dyn Mailer>,
    /// Per-client submission cap; `None` accepts every valid submission.
    pub limiter: Option<SubmissionLimiter>,
    pub email: ContactEmailSettings,
}

impl<R> ContactHandler<R>
where
    R: ContactRepository + ?Sized,
{
    pub fn new(
        contact_repo: Arc<R>,
        mailer: Arc<dyn Mailer>,
        limiter: Option<SubmissionLimiter>,
        email: ContactEmailSettings,
    ) -> Self {
        ContactHandler { contact_repo, mailer, limiter, email }
    }

    /// Persists a submission and queues the owner notification and the
    /// auto-reply. Delivery runs detached; its failures are only logged.
    pub async fn submit(
        &self,
        form: ContactForm,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<SubmissionReceipt, AppError> {
        if let Some(limiter) = &self.limiter {
            let key = ip.as_deref().unwrap_or("unknown");
            if let RateDecision::Limited { retry_after } = limiter.check(key) {
                warn!(client = %key, "Contact submission rate limited");
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                return Err(AppError::TooManyRequests { retry_after: secs.max(1) });
            }
        }

        let submission = ContactSubmission::from_form(form, ip, user_agent)?;
        let message = self.contact_repo.create_contact(&submission).await?;
        info!(contact_id = %message.id, "Contact message stored");

        let sent_at = Utc::now();
        self.dispatch(
            templates::owner_notification(&message, &self.email.admin_email, sent_at),
            "notification",
        );
        self.dispatch(templates::auto_reply(&message, &self.email.owner_name), "auto-reply");

        Ok(SubmissionReceipt { id: message.id, created_at: message.created_at })
    }

    fn dispatch(&self, email: OutgoingEmail, kind: &'static str) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(e) = mailer.send(email).await {
                error!(kind, error = %e, "Failed to send contact email");
            }
        });
    }

    pub async fn list_contacts(&self, query: &ContactListQuery) -> Result<Paginated<ContactMessage>, AppError> {
        let page = query.pagination();
        let (messages, total) = self.contact_repo.list_contacts(query.status(), page).await?;
        Ok(Paginated::new(messages, total, page))
    }

    /// Opening a `new` message marks it as read.
    pub async fn get_contact(&self, id: &str) -> Result<ContactMessage, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let mut message = self.contact_repo.get_contact_by_id(&id).await?;

        if message.status == ContactStatus::New {
            message.status = ContactStatus::Read;
            message.updated_at = Utc::now();
            message = self.contact_repo.save_contact(&message).await?;
        }
        Ok(message)
    }

    pub async fn update_contact(&self, id: &str, patch: ContactPatch) -> Result<ContactMessage, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let patch = patch.normalized();
        patch.validate()?;

        let mut message = self.contact_repo.get_contact_by_id(&id).await?;
        message.apply_patch(patch, Utc::now())?;
        self.contact_repo.save_contact(&message).await
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        self.contact_repo.delete_contact(&id).await
    }

    pub async fn stats(&self) -> Result<ContactStats, AppError> {
        self.contact_repo.contact_stats(start_of_day(Utc::now())).await
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::email::{EmailError, LogMailer},
        repositories::memory::MemoryContactRepo,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: OutgoingEmail) -> Result<(), EmailError> {
            Err(EmailError::Transport("connection refused".into()))
        }
    }

    fn handler(mailer: Arc<dyn Mailer>, limit: Option<u64>) -> ContactHandler<MemoryContactRepo> {
        ContactHandler::new(
            Arc::new(MemoryContactRepo::new()),
            mailer,
            limit.map(|limit| SubmissionLimiter::new(limit, Duration::from_secs(3600))),
            ContactEmailSettings {
                admin_email: "owner@example.com".into(),
                owner_name: "Portfolio Owner".into(),
            },
        )
    }

    fn form() -> ContactForm {
        ContactForm {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            subject: Some("Project inquiry".into()),
            message: Some("Hello, I would like to collaborate.".into()),
        }
    }

    #[tokio::test]
    async fn mail_failures_do_not_fail_submission() {
        let handler = handler(Arc::new(FailingMailer), None);
        let receipt = handler.submit(form(), Some("10.0.0.1".into()), None).await.unwrap();

        let stored = handler.contact_repo.get_contact_by_id(&receipt.id).await.unwrap();
        assert_eq!(stored.status, ContactStatus::New);
    }

    #[tokio::test]
    async fn excess_submissions_are_limited() {
        let handler = handler(Arc::new(LogMailer), Some(1));
        handler.submit(form(), Some("10.0.0.2".into()), None).await.unwrap();

        let err = handler.submit(form(), Some("10.0.0.2".into()), None).await.unwrap_err();
        assert!(matches!(err, AppError::TooManyRequests { retry_after } if retry_after > 0));
    }

    #[tokio::test]
    async fn without_a_limiter_every_valid_submission_is_stored() {
        let handler = handler(Arc::new(LogMailer), None);
        for _ in 0..6 {
            handler.submit(form(), None, None).await.unwrap();
        }
        assert_eq!(handler.stats().await.unwrap().total, 6);
    }

    #[tokio::test]
    async fn reading_marks_new_messages_read() {
        let handler = handler(Arc::new(LogMailer), None);
        let receipt = handler.submit(form(), None, None).await.unwrap();

        let message = handler.get_contact(&receipt.id.to_string()).await.unwrap();
        assert_eq!(message.status, ContactStatus::Read);

        let stats = handler.stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.by_status.get("read"), Some(&1));
    }

    #[test]
    fn start_of_day_truncates_time() {
        let now = "2024-03-15T17:42:10Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(start_of_day(now).to_rfc3339(), "2024-03-15T00:00:00+00:00");
    }
}
