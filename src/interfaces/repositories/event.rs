use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        event::{Event, EventDraft, EventFilter, EventRow},
        pagination::{CountBucket, Pagination},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxEventRepo,
};

const EVENT_COLUMNS: &str = "id, title, role, event_type, description, long_description, highlights, \
    tech_stack, achievement, date, end_date, location, is_virtual, organizer, team_size, \
    project_name, project_url, certificate_url, image, featured, sort_order, status, \
    created_at, updated_at";

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError>;
    async fn get_event_by_id(&self, id: &Uuid) -> Result<Event, AppError>;
    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> Result<(Vec<Event>, i64), AppError>;
    async fn get_featured_events(&self) -> Result<Vec<Event>, AppError>;
    /// Completed event counts per type, largest first.
    async fn count_by_type(&self) -> Result<Vec<CountBucket>, AppError>;
    async fn save_event(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError>;
    async fn replace_all_events(&self, drafts: &[EventDraft]) -> Result<usize, AppError>;
}

impl SqlxEventRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxEventRepo { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    builder.push(" WHERE status = 'completed'");
    if let Some(event_type) = &filter.event_type {
        builder.push(" AND event_type = ").push_bind(event_type.clone());
    }
    if filter.featured_only {
        builder.push(" AND featured = TRUE");
    }
}

fn into_events(rows: Vec<EventRow>) -> Result<Vec<Event>, AppError> {
    rows.into_iter().map(Event::try_from).collect()
}

async fn insert_draft<'e, E>(executor: E, draft: &EventDraft) -> Result<EventRow, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let sql = format!(
        "INSERT INTO events (
            id, title, role, event_type, description, long_description, highlights, tech_stack,
            achievement, date, end_date, location, is_virtual, organizer, team_size, project_name,
            project_url, certificate_url, image, featured, sort_order, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
        RETURNING {EVENT_COLUMNS}"
    );

    sqlx::query_as::<_, EventRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.role)
        .bind(draft.event_type.as_ref())
        .bind(&draft.description)
        .bind(&draft.long_description)
        .bind(&draft.highlights)
        .bind(&draft.tech_stack)
        .bind(&draft.achievement)
        .bind(draft.date)
        .bind(draft.end_date)
        .bind(&draft.location)
        .bind(draft.is_virtual)
        .bind(&draft.organizer)
        .bind(draft.team_size)
        .bind(&draft.project_name)
        .bind(&draft.project_url)
        .bind(&draft.certificate_url)
        .bind(&draft.image)
        .bind(draft.featured)
        .bind(draft.order)
        .bind(draft.status.as_ref())
        .fetch_one(executor)
        .await
}

#[async_trait]
impl EventRepository for SqlxEventRepo {
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError> {
        let row = insert_draft(&self.pool, draft).await?;
        Event::try_from(row)
    }

    async fn get_event_by_id(&self, id: &Uuid) -> Result<Event, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        Event::try_from(row)
    }

    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> Result<(Vec<Event>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM events");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY featured DESC, date DESC, sort_order ASC");
        builder.push(" LIMIT ").push_bind(page.limit as i64);
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows: Vec<EventRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok((into_events(rows)?, total))
    }

    async fn get_featured_events(&self) -> Result<Vec<Event>, AppError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE status = 'completed' AND featured = TRUE
             ORDER BY sort_order ASC, date DESC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql).fetch_all(&self.pool).await?;

        into_events(rows)
    }

    async fn count_by_type(&self) -> Result<Vec<CountBucket>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT event_type, COUNT(*) AS count FROM events
             WHERE status = 'completed'
             GROUP BY event_type
             ORDER BY count DESC, event_type ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| CountBucket { key, count })
            .collect())
    }

    async fn save_event(&self, event: &Event) -> Result<Event, AppError> {
        let sql = format!(
            "UPDATE events SET
                title = $2, role = $3, event_type = $4, description = $5, long_description = $6,
                highlights = $7, tech_stack = $8, achievement = $9, date = $10, end_date = $11,
                location = $12, is_virtual = $13, organizer = $14, team_size = $15,
                project_name = $16, project_url = $17, certificate_url = $18, image = $19,
                featured = $20, sort_order = $21, status = $22, updated_at = $23
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.role)
            .bind(event.event_type.as_ref())
            .bind(&event.description)
            .bind(&event.long_description)
            .bind(&event.highlights)
            .bind(&event.tech_stack)
            .bind(&event.achievement)
            .bind(event.date)
            .bind(event.end_date)
            .bind(&event.location)
            .bind(event.is_virtual)
            .bind(&event.organizer)
            .bind(event.team_size)
            .bind(&event.project_name)
            .bind(&event.project_url)
            .bind(&event.certificate_url)
            .bind(&event.image)
            .bind(event.featured)
            .bind(event.order)
            .bind(event.status.as_ref())
            .bind(event.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        Event::try_from(row)
    }

    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn replace_all_events(&self, drafts: &[EventDraft]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM events").execute(&mut *tx).await?;
        for draft in drafts {
            insert_draft(&mut *tx, draft).await?;
        }

        tx.commit().await?;
        Ok(drafts.len())
    }
}
