use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::contact::{ContactForm, ContactListQuery, ContactPatch},
    errors::AppError,
    utils::get_client_ip::{get_client_ip, get_user_agent},
    AppState,
};

#[instrument(skip(req, state, form))]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<impl Responder, AppError> {
    let ip = get_client_ip(&req, state.config.trust_x_forwarded_for);
    let user_agent = get_user_agent(&req);

    let receipt = state
        .contact_handler
        .submit(form.into_inner(), ip, user_agent)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Message sent successfully! I'll get back to you soon.",
        "data": receipt
    })))
}

#[instrument(skip(state))]
pub async fn list_contacts(
    state: web::Data<AppState>,
    query: web::Query<ContactListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.contact_handler.list_contacts(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_contact_stats(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let stats = state.contact_handler.stats().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": stats })))
}

#[instrument(skip(state))]
pub async fn get_contact(
    contact_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let message = state.contact_handler.get_contact(&contact_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": message })))
}

#[instrument(skip(state, data))]
pub async fn update_contact(
    contact_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ContactPatch>,
) -> Result<impl Responder, AppError> {
    let message = state
        .contact_handler
        .update_contact(&contact_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": message })))
}

#[instrument(skip(state))]
pub async fn delete_contact(
    contact_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.contact_handler.delete_contact(&contact_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Contact message deleted successfully"
    })))
}
