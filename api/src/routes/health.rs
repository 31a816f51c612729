use actix_web::{web, HttpResponse};

use crate::app::AppState;

/// Handler for GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tokenkeeper-api",
        "version": env!("CARGO_PKG_VERSION"),
        "signing_key_loaded": state.registry.is_bootstrapped(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
