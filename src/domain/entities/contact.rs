use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        pagination::Pagination,
        validation::{trim_opt, validate_enum},
    },
    errors::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(
        required(message = "Name is required"),
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Subject is required"),
        length(min = 5, max = 200, message = "Subject must be between 5 and 200 characters")
    )]
    pub subject: Option<String>,

    #[validate(
        required(message = "Message is required"),
        length(min = 10, max = 5000, message = "Message must be between 10 and 5000 characters")
    )]
    pub message: Option<String>,
}

impl ContactForm {
    pub fn normalized(self) -> Self {
        ContactForm {
            name: trim_opt(self.name),
            email: trim_opt(self.email).map(|e| e.to_lowercase()),
            subject: trim_opt(self.subject),
            message: trim_opt(self.message),
        }
    }
}

/// A contact form that passed validation.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ContactSubmission {
    pub fn from_form(form: ContactForm, ip: Option<String>, user_agent: Option<String>) -> Result<Self, AppError> {
        let form = form.normalized();
        form.validate()?;

        Ok(ContactSubmission {
            name: form.name.unwrap_or_default(),
            email: form.email.unwrap_or_default(),
            subject: form.subject.unwrap_or_default(),
            message: form.message.unwrap_or_default(),
            ip,
            user_agent,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub replied: bool,
    pub replied_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub replied: bool,
    pub replied_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for ContactMessage {
    type Error = AppError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            AppError::InternalError(format!("Stored contact {} has invalid status: {}", row.id, row.status))
        })?;

        Ok(ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            status,
            ip: row.ip,
            user_agent: row.user_agent,
            replied: row.replied,
            replied_at: row.replied_at,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ContactMessage {
    pub fn from_submission(submission: ContactSubmission, id: Uuid, now: DateTime<Utc>) -> Self {
        ContactMessage {
            id,
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            status: ContactStatus::New,
            ip: submission.ip,
            user_agent: submission.user_agent,
            replied: false,
            replied_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moving to `replied` stamps the reply time; other fields are untouched
    /// when absent from the patch.
    pub fn apply_patch(&mut self, patch: ContactPatch, now: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(status) = patch.status.as_deref() {
            let status: ContactStatus = status
                .parse()
                .map_err(|_| AppError::BadRequest(format!("Invalid status: {}", status)))?;
            self.status = status;
            if status == ContactStatus::Replied {
                self.replied = true;
                self.replied_at = Some(now);
            }
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactPatch {
    #[validate(custom(function = "validate_contact_status"))]
    pub status: Option<String>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

impl ContactPatch {
    pub fn normalized(self) -> Self {
        ContactPatch {
            status: trim_opt(self.status),
            notes: trim_opt(self.notes),
        }
    }
}

pub fn validate_contact_status(value: &str) -> Result<(), ValidationError> {
    validate_enum::<ContactStatus>(value, "status")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ContactListQuery {
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Acknowledgement returned to the visitor after a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: i64,
    pub today: i64,
    pub by_status: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: Some("  Ada Lovelace ".into()),
            email: Some(" Ada@Example.COM ".into()),
            subject: Some("Project inquiry".into()),
            message: Some("I would like to talk about a project.".into()),
        }
    }

    #[test]
    fn submission_is_trimmed_and_lowercased() {
        let submission = ContactSubmission::from_form(form(), None, None).unwrap();
        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.email, "ada@example.com");
    }

    #[test]
    fn short_fields_are_rejected() {
        let short = ContactForm {
            subject: Some("Hi".into()),
            message: Some("short".into()),
            ..form()
        };
        match ContactSubmission::from_form(short, None, None).unwrap_err() {
            AppError::ValidationError(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["message", "subject"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_email_is_rejected() {
        let bad = ContactForm { email: Some("not-an-email".into()), ..form() };
        assert!(ContactSubmission::from_form(bad, None, None).is_err());
    }

    #[test]
    fn replied_patch_stamps_reply() {
        let now = Utc::now();
        let submission = ContactSubmission::from_form(form(), None, None).unwrap();
        let mut message = ContactMessage::from_submission(submission, Uuid::new_v4(), now);

        message
            .apply_patch(ContactPatch { status: Some("replied".into()), notes: Some("Sent pricing".into()) }, now)
            .unwrap();

        assert_eq!(message.status, ContactStatus::Replied);
        assert!(message.replied);
        assert_eq!(message.replied_at, Some(now));
        assert_eq!(message.notes.as_deref(), Some("Sent pricing"));
    }
}
