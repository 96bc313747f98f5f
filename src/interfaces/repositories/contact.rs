use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        contact::{ContactMessage, ContactRow, ContactStats, ContactSubmission},
        pagination::Pagination,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxContactRepo,
};

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, status, ip, user_agent, replied, \
    replied_at, notes, created_at, updated_at";

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create_contact(&self, submission: &ContactSubmission) -> Result<ContactMessage, AppError>;
    async fn get_contact_by_id(&self, id: &Uuid) -> Result<ContactMessage, AppError>;
    /// Newest first, optionally restricted to one status.
    async fn list_contacts(&self, status: Option<&str>, page: Pagination) -> Result<(Vec<ContactMessage>, i64), AppError>;
    async fn save_contact(&self, message: &ContactMessage) -> Result<ContactMessage, AppError>;
    async fn delete_contact(&self, id: &Uuid) -> Result<(), AppError>;
    /// `today` counts messages created at or after `since`.
    async fn contact_stats(&self, since: DateTime<Utc>) -> Result<ContactStats, AppError>;
}

impl SqlxContactRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxContactRepo { pool }
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepo {
    async fn create_contact(&self, submission: &ContactSubmission) -> Result<ContactMessage, AppError> {
        let sql = format!(
            "INSERT INTO contacts (id, name, email, subject, message, ip, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CONTACT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&submission.name)
            .bind(&submission.email)
            .bind(&submission.subject)
            .bind(&submission.message)
            .bind(&submission.ip)
            .bind(&submission.user_agent)
            .fetch_one(&self.pool)
            .await?;

        ContactMessage::try_from(row)
    }

    async fn get_contact_by_id(&self, id: &Uuid) -> Result<ContactMessage, AppError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1");
        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact message not found".into()))?;

        ContactMessage::try_from(row)
    }

    async fn list_contacts(&self, status: Option<&str>, page: Pagination) -> Result<(Vec<ContactMessage>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM contacts");
        if let Some(status) = status {
            count.push(" WHERE status = ").push_bind(status.to_string());
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status.to_string());
        }
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit as i64);
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows: Vec<ContactRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        let messages = rows
            .into_iter()
            .map(ContactMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((messages, total))
    }

    async fn save_contact(&self, message: &ContactMessage) -> Result<ContactMessage, AppError> {
        let sql = format!(
            "UPDATE contacts SET
                status = $2, replied = $3, replied_at = $4, notes = $5, updated_at = $6
             WHERE id = $1
             RETURNING {CONTACT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(message.id)
            .bind(message.status.as_ref())
            .bind(message.replied)
            .bind(message.replied_at)
            .bind(&message.notes)
            .bind(message.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact message not found".into()))?;

        ContactMessage::try_from(row)
    }

    async fn delete_contact(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Contact message not found".into()));
        }
        Ok(())
    }

    async fn contact_stats(&self, since: DateTime<Utc>) -> Result<ContactStats, AppError> {
        let (total, today): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE created_at >= $1) FROM contacts",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contacts GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        Ok(ContactStats {
            total,
            today,
            by_status: by_status.into_iter().collect(),
        })
    }
}
