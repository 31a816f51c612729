use actix_web::{web, HttpResponse};
use tk_core::errors::DomainResult;
use tk_core::services::rotation::RotationOutcome;
use tracing::info;

use super::require_admin;
use crate::app::AppState;
use crate::dto::KeyRotationResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/admin/rotate-keys
///
/// Generates and installs a new signing key. Tokens signed by the previous
/// key keep verifying until it falls out of the archive.
///
/// ## Errors
/// - 401 Unauthorized: missing or invalid access token
/// - 403 Forbidden: caller is not an administrator
/// - 500 Internal Server Error: generation or persistence failed, retryable
pub async fn rotate_keys(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match rotate(&state, &auth).await {
        Ok(outcome) => HttpResponse::Ok().json(KeyRotationResponse::from(outcome)),
        Err(error) => handle_domain_error(error),
    }
}

async fn rotate(state: &AppState, auth: &AuthContext) -> DomainResult<RotationOutcome> {
    require_admin(state, auth)?;

    info!(subject = %auth.subject, "Key rotation requested");

    Ok(state.coordinator.rotate_now().await?)
}
