use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        pagination::{with_total_bucket, CountBucket, Paginated},
        project::{NewProjectRequest, ProjectDraft, ProjectListQuery, ProjectResponse, UpdateProjectRequest},
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    utils::valid_uuid::valid_uuid,
};

const NOT_FOUND: &str = "Project not found";

pub struct ProjectHandler<R>
where
    R: ProjectRepository + ?Sized,
{
    pub project_repo: Arc<R>,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository + ?Sized,
{
    pub fn new(project_repo: Arc<R>) -> Self {
        ProjectHandler { project_repo }
    }

    /// Published projects, filtered and paginated. Never fails on an empty
    /// result.
    pub async fn list_projects(&self, query: &ProjectListQuery) -> Result<Paginated<ProjectResponse>, AppError> {
        let page = query.pagination();
        let (projects, total) = self.project_repo.list_projects(&query.filter(), page).await?;

        Ok(Paginated::new(projects, total, page).map(ProjectResponse::from))
    }

    /// Looks a project up by id first, then by slug.
    pub async fn get_project(&self, id_or_slug: &str) -> Result<ProjectResponse, AppError> {
        let key = id_or_slug.trim();

        if let Ok(id) = Uuid::parse_str(key) {
            match self.project_repo.get_project_by_id(&id).await {
                Ok(project) => return Ok(project.into()),
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.project_repo
            .get_project_by_slug(&key.to_lowercase())
            .await
            .map(ProjectResponse::from)
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(NOT_FOUND.into()),
                other => other,
            })
    }

    pub async fn featured_projects(&self) -> Result<Vec<ProjectResponse>, AppError> {
        let projects = self.project_repo.get_featured_projects().await?;
        Ok(projects.into_iter().map(ProjectResponse::from).collect())
    }

    /// Category counts led by an `All` bucket holding the total.
    pub async fn categories(&self) -> Result<Vec<CountBucket>, AppError> {
        let buckets = self.project_repo.count_by_category().await?;
        let total = buckets.iter().map(|b| b.count).sum();
        Ok(with_total_bucket("All", total, buckets))
    }

    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectResponse, AppError> {
        let draft = ProjectDraft::try_from(request)?;
        let project = self.project_repo.create_project(&draft).await?;

        tracing::info!(project_id = %project.id, slug = %project.slug, "Project created");
        Ok(project.into())
    }

    pub async fn update_project(&self, id: &str, request: UpdateProjectRequest) -> Result<ProjectResponse, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let request = request.normalized();
        request.validate()?;

        let mut project = self.project_repo.get_project_by_id(&id).await?;
        project.apply_update(request, Utc::now())?;
        let saved = self.project_repo.save_project(&project).await?;

        Ok(saved.into())
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        self.project_repo.delete_project(&id).await?;

        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryProjectRepo;

    fn handler() -> ProjectHandler<MemoryProjectRepo> {
        ProjectHandler::new(Arc::new(MemoryProjectRepo::seeded().unwrap()))
    }

    #[tokio::test]
    async fn slug_and_id_resolve_to_same_project() {
        let handler = handler();
        let by_slug = handler.get_project("creative-os").await.unwrap();
        let by_id = handler.get_project(&by_slug.project.id.to_string()).await.unwrap();
        assert_eq!(by_slug.project, by_id.project);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let err = handler().get_project("no-such-project").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == NOT_FOUND));

        let err = handler().get_project(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn categories_lead_with_total() {
        let buckets = handler().categories().await.unwrap();
        assert_eq!(buckets[0], CountBucket { key: "All".into(), count: 6 });
    }

    #[tokio::test]
    async fn update_with_malformed_id_is_not_found() {
        let err = handler()
            .update_project("123", UpdateProjectRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_persists_changes() {
        let handler = handler();
        let project = handler.get_project("toolbox").await.unwrap().project;

        let request: UpdateProjectRequest =
            serde_json::from_str(r#"{"featured": true, "tagline": "  Pro image tools "}"#).unwrap();
        let updated = handler.update_project(&project.id.to_string(), request).await.unwrap();

        assert!(updated.project.featured);
        assert_eq!(updated.project.tagline.as_deref(), Some("Pro image tools"));
        assert_eq!(updated.project.title, "Toolbox");
    }
}
