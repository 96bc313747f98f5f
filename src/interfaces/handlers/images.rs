use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::gallery::{GalleryQuery, ImageListQuery, ImageListResponse},
    errors::AppError,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_images(
    state: web::Data<AppState>,
    query: web::Query<ImageListQuery>,
) -> Result<impl Responder, AppError> {
    let images = state.gallery_handler.list(query.folder.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ImageListResponse::new(images)))
}

#[instrument(skip(state))]
pub async fn get_gallery(
    state: web::Data<AppState>,
    query: web::Query<GalleryQuery>,
) -> Result<impl Responder, AppError> {
    let gallery = state.gallery_handler.gallery(&query).await?;
    Ok(HttpResponse::Ok().json(gallery))
}
