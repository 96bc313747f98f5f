use actix_web::{get, HttpRequest, HttpResponse, Responder};

use crate::errors::AppError;

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Portfolio API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/health",
        "endpoints": ["/api/projects", "/api/events", "/api/contact", "/api/images"]
    }))
}

/// Fallback for every unmatched route.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("Not Found - {}", req.path())))
}
