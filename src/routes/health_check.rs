use actix_web::{HttpResponse, Responder};

/// Liveness probe; answers `{"status": "ok"}` without touching the store.
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
