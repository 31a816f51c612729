use actix_web::{web, HttpResponse};
use tk_core::domain::entities::token::{TokenKind, TokenPair};
use tk_core::errors::DomainResult;
use tracing::info;

use crate::app::AppState;
use crate::dto::{RefreshTokenRequest, TokenResponse};
use crate::handlers::handle_domain_error;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a valid refresh token for a new access/refresh pair signed with
/// the current key.
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "eyJ..." }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "bearer",
///     "expires_in": 1800,
///     "refresh_expires_in": 604800
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: the refresh token is invalid, expired or an access token
/// - 500 Internal Server Error: no signing key available
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse {
    match refresh_pair(&state, &request.refresh_token) {
        Ok(pair) => {
            info!(key_id = %pair.key_id, "Issued refreshed token pair");
            HttpResponse::Ok().json(TokenResponse::from(pair))
        }
        Err(error) => handle_domain_error(error),
    }
}

fn refresh_pair(state: &AppState, refresh_token: &str) -> DomainResult<TokenPair> {
    let subject = state.verifier.verify(refresh_token, TokenKind::Refresh)?;
    Ok(state.issuer.issue_pair(&subject)?)
}
