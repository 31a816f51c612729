//! Access token authentication middleware.
//!
//! Extracts the token from the `Authorization: Bearer` header, or from the
//! access token cookie when no header is present, verifies it as an access
//! token and injects the verified subject into the request extensions.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized, InternalError};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tk_core::domain::entities::token::TokenKind;
use tk_core::services::token::SchemeKind;
use tracing::debug;

use crate::app::AppState;
use crate::handlers::unauthorized;

/// Verified caller injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject from the verified access token
    pub subject: String,
    /// Key id the token claimed
    pub key_id: Option<String>,
    /// Whether the token was accepted through the legacy shared secret
    pub legacy: bool,
}

/// Access token authentication middleware factory
///
/// Requires `web::Data<AppState>` to be registered on the app.
#[derive(Debug, Clone, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Access token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.clone(),
                None => return Err(ErrorInternalServerError("Token verifier not configured")),
            };

            let token = match extract_token(req.request(), &state.auth.cookie_name) {
                Some(token) => token,
                None => {
                    debug!("Request without access token");
                    return Err(rejection());
                }
            };

            let verified = match state.verifier.verify_detailed(&token, TokenKind::Access) {
                Ok(verified) => verified,
                // The verifier already logged the typed reason
                Err(_) => return Err(rejection()),
            };

            req.extensions_mut().insert(AuthContext {
                subject: verified.subject,
                key_id: verified.key_id,
                legacy: verified.scheme == SchemeKind::Legacy,
            });

            service.call(req).await
        })
    }
}

fn rejection() -> Error {
    InternalError::from_response("unauthenticated", unauthorized()).into()
}

/// Reads the access token, preferring the bearer header over the cookie
pub fn extract_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(token) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_credentials)
    {
        return Some(token.to_string());
    }

    req.cookie(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Token from an `Authorization` value; the scheme name is case-insensitive
fn bearer_credentials(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}
