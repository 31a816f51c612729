use actix_web::http::header;
use actix_web::HttpResponse;
use tk_core::errors::{DomainError, KeyError, TokenError};
use tk_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use tracing::{debug, error, warn};

/// Generic 401 that does not reveal why authentication failed
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
        .json(ErrorResponse::new(
            error_codes::UNAUTHORIZED,
            "Could not validate credentials",
        ))
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse::new(
        error_codes::FORBIDDEN,
        "Administrator access required",
    ))
}

fn token_error_response(err: &TokenError) -> HttpResponse {
    if err.is_authentication_failure() {
        debug!(reason = err.error_code(), "Authentication failed");
        return unauthorized();
    }

    error!(error = %err, "Token service failure");
    HttpResponse::InternalServerError().json(err.to_error_response())
}

fn key_error_response(err: &KeyError) -> HttpResponse {
    error!(error = %err, "Key management failure");
    let response = if err.is_retryable() {
        ErrorResponse::new(
            error_codes::KEY_ROTATION_FAILED,
            "Key rotation failed, please retry",
        )
        .add_detail("reason", err.error_code())
    } else {
        err.to_error_response()
    };
    HttpResponse::InternalServerError().json(response)
}

/// Maps a request failure onto its HTTP response
pub fn handle_domain_error(err: DomainError) -> HttpResponse {
    match err {
        DomainError::Forbidden { subject } => {
            warn!(subject = %subject, "Non-administrator attempted key administration");
            forbidden()
        }
        DomainError::Token(e) => token_error_response(&e),
        DomainError::Key(e) => key_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use tk_core::domain::entities::token::TokenKind;

    #[test]
    fn test_verification_failures_are_401() {
        for err in [
            TokenError::Malformed,
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::WrongTokenType {
                expected: TokenKind::Refresh,
                actual: "access".into(),
            },
        ] {
            assert_eq!(token_error_response(&err).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_key_unavailable_is_500() {
        assert_eq!(
            token_error_response(&TokenError::KeyUnavailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(
            handle_domain_error(DomainError::Forbidden { subject: "mallory".into() }).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            handle_domain_error(TokenError::Expired.into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            handle_domain_error(KeyError::KeyUnavailable.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            handle_domain_error(KeyError::PersistenceFailed { message: "disk".into() }.into())
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
