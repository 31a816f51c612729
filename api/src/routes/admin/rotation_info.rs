use actix_web::{web, HttpResponse};

use super::require_admin;
use crate::app::AppState;
use crate::dto::KeyRotationInfoResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/admin/key-rotation-info
pub async fn key_rotation_info(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match require_admin(&state, &auth) {
        Ok(()) => HttpResponse::Ok().json(KeyRotationInfoResponse {
            info: state.registry.rotation_info(),
            rotation_phase: state.coordinator.phase(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
