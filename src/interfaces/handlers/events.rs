use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::event::{EventListQuery, NewEventRequest, UpdateEventRequest},
    errors::AppError,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_events(
    state: web::Data<AppState>,
    query: web::Query<EventListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.event_handler.list_events(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_featured_events(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let events = state.event_handler.featured_events().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": events.len(),
        "data": events
    })))
}

#[instrument(skip(state))]
pub async fn get_event_types(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let types = state.event_handler.types().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": types })))
}

#[instrument(skip(state))]
pub async fn get_event(
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let event = state.event_handler.get_event(&event_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event })))
}

#[instrument(skip(state, data))]
pub async fn create_event(
    state: web::Data<AppState>,
    data: web::Json<NewEventRequest>,
) -> Result<impl Responder, AppError> {
    let event = state.event_handler.create_event(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "data": event })))
}

#[instrument(skip(state, data))]
pub async fn update_event(
    event_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateEventRequest>,
) -> Result<impl Responder, AppError> {
    let event = state.event_handler.update_event(&event_id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event })))
}

#[instrument(skip(state))]
pub async fn delete_event(
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.event_handler.delete_event(&event_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Event deleted successfully"
    })))
}
