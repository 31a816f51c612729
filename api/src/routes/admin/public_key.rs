use actix_web::{web, HttpResponse};
use tk_core::errors::DomainResult;

use super::require_admin;
use crate::app::AppState;
use crate::dto::PublicKeyResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/admin/public-key
///
/// Exports the current verification key so other services can check
/// RS256 tokens without calling back.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "public_key": "-----BEGIN PUBLIC KEY-----\n...",
///     "algorithm": "RS256",
///     "key_id": "key_20240101_000000_000000"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: missing or invalid access token
/// - 403 Forbidden: caller is not an administrator
/// - 500 Internal Server Error: no signing key installed
pub async fn public_key(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match current_public_key(&state, &auth) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(error) => handle_domain_error(error),
    }
}

fn current_public_key(state: &AppState, auth: &AuthContext) -> DomainResult<PublicKeyResponse> {
    require_admin(state, auth)?;
    let current = state.registry.get_current()?;
    Ok(PublicKeyResponse::from(current.as_ref()))
}
