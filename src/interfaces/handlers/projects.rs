use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::project::{NewProjectRequest, ProjectListQuery, UpdateProjectRequest},
    errors::AppError,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.project_handler.list_projects(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_featured_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.featured_projects().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": projects.len(),
        "data": projects
    })))
}

#[instrument(skip(state))]
pub async fn get_categories(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.project_handler.categories().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": categories })))
}

#[instrument(skip(state))]
pub async fn get_project(
    id_or_slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(&id_or_slug).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": project })))
}

#[instrument(skip(state, data))]
pub async fn create_project(
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "data": project })))
}

#[instrument(skip(state, data))]
pub async fn update_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .update_project(&project_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": project })))
}

#[instrument(skip(state))]
pub async fn delete_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(&project_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Project deleted successfully"
    })))
}
