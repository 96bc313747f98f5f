use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        pagination::{CountBucket, Pagination},
        project::{Project, ProjectDraft, ProjectFilter, ProjectRow},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, title, slug, tagline, description, long_description, tech_stack, \
    image, images, live_url, github_url, category, project_type, featured, sort_order, status, \
    start_date, end_date, highlights, case_study, outcome, created_at, updated_at";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError>;
    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError>;
    async fn get_project_by_slug(&self, slug: &str) -> Result<Project, AppError>;
    /// Sorted page of published projects plus the total matching the filter.
    async fn list_projects(&self, filter: &ProjectFilter, page: Pagination) -> Result<(Vec<Project>, i64), AppError>;
    async fn get_featured_projects(&self) -> Result<Vec<Project>, AppError>;
    /// Published project counts per category, largest first.
    async fn count_by_category(&self) -> Result<Vec<CountBucket>, AppError>;
    async fn save_project(&self, project: &Project) -> Result<Project, AppError>;
    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError>;
    /// Drops every project and inserts `drafts` in a single transaction.
    async fn replace_all_projects(&self, drafts: &[ProjectDraft]) -> Result<usize, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    builder.push(" WHERE status = 'published'");
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if filter.featured_only {
        builder.push(" AND featured = TRUE");
    }
}

fn into_projects(rows: Vec<ProjectRow>) -> Result<Vec<Project>, AppError> {
    rows.into_iter().map(Project::try_from).collect()
}

async fn insert_draft<'e, E>(executor: E, draft: &ProjectDraft) -> Result<ProjectRow, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let sql = format!(
        "INSERT INTO projects (
            id, title, slug, tagline, description, long_description, tech_stack, image, images,
            live_url, github_url, category, project_type, featured, sort_order, status,
            start_date, end_date, highlights, case_study, outcome
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        RETURNING {PROJECT_COLUMNS}"
    );

    sqlx::query_as::<_, ProjectRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.tagline)
        .bind(&draft.description)
        .bind(&draft.long_description)
        .bind(&draft.tech_stack)
        .bind(&draft.image)
        .bind(&draft.images)
        .bind(&draft.live_url)
        .bind(&draft.github_url)
        .bind(draft.category.as_ref())
        .bind(draft.project_type.map(|t| t.to_string()))
        .bind(draft.featured)
        .bind(draft.order)
        .bind(draft.status.as_ref())
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.highlights)
        .bind(draft.case_study.as_ref().map(Json))
        .bind(&draft.outcome)
        .fetch_one(executor)
        .await
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError> {
        let row = insert_draft(&self.pool, draft).await?;
        Project::try_from(row)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        Project::try_from(row)
    }

    async fn get_project_by_slug(&self, slug: &str) -> Result<Project, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        Project::try_from(row)
    }

    async fn list_projects(&self, filter: &ProjectFilter, page: Pagination) -> Result<(Vec<Project>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM projects");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY featured DESC, sort_order ASC, created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit as i64);
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows: Vec<ProjectRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok((into_projects(rows)?, total))
    }

    async fn get_featured_projects(&self) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE status = 'published' AND featured = TRUE
             ORDER BY sort_order ASC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql).fetch_all(&self.pool).await?;

        into_projects(rows)
    }

    async fn count_by_category(&self) -> Result<Vec<CountBucket>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) AS count FROM projects
             WHERE status = 'published'
             GROUP BY category
             ORDER BY count DESC, category ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| CountBucket { key, count })
            .collect())
    }

    async fn save_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            "UPDATE projects SET
                title = $2, slug = $3, tagline = $4, description = $5, long_description = $6,
                tech_stack = $7, image = $8, images = $9, live_url = $10, github_url = $11,
                category = $12, project_type = $13, featured = $14, sort_order = $15, status = $16,
                start_date = $17, end_date = $18, highlights = $19, case_study = $20, outcome = $21,
                updated_at = $22
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.slug)
            .bind(&project.tagline)
            .bind(&project.description)
            .bind(&project.long_description)
            .bind(&project.tech_stack)
            .bind(&project.image)
            .bind(&project.images)
            .bind(&project.live_url)
            .bind(&project.github_url)
            .bind(project.category.as_ref())
            .bind(project.project_type.map(|t| t.to_string()))
            .bind(project.featured)
            .bind(project.order)
            .bind(project.status.as_ref())
            .bind(project.start_date)
            .bind(project.end_date)
            .bind(&project.highlights)
            .bind(project.case_study.as_ref().map(Json))
            .bind(&project.outcome)
            .bind(project.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        Project::try_from(row)
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".into()));
        }
        Ok(())
    }

    async fn replace_all_projects(&self, drafts: &[ProjectDraft]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
        for draft in drafts {
            insert_draft(&mut *tx, draft).await?;
        }

        tx.commit().await?;
        Ok(drafts.len())
    }
}
