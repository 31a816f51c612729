//! Error types for token issuance/verification and key lifecycle operations
//!
//! Every token verification failure collapses to "unauthenticated" at the HTTP
//! boundary; the variants here exist so the reason can be logged and counted.

use thiserror::Error;
use tk_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

use crate::domain::entities::token::TokenKind;

/// Token issuance and verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token cannot be split into header, payload and signature, or its
    /// header/payload do not decode
    #[error("Malformed token")]
    Malformed,

    /// Neither the resolved RSA key nor the legacy secret verifies the signature
    #[error("Token signature verification failed")]
    InvalidSignature,

    /// Signature is valid but the `type` claim is not the expected kind
    #[error("Wrong token type: expected {expected}, got {actual:?}")]
    WrongTokenType { expected: TokenKind, actual: String },

    /// Signature and type are valid but `exp` is in the past
    #[error("Token expired")]
    Expired,

    /// No signing key is installed in the registry
    #[error("No signing key available")]
    KeyUnavailable,

    /// The JWT library refused to sign the claims
    #[error("Token signing failed: {message}")]
    SigningFailed { message: String },
}

impl TokenError {
    /// Stable code for logs and metrics
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "TOKEN_MALFORMED",
            TokenError::InvalidSignature => "TOKEN_INVALID_SIGNATURE",
            TokenError::WrongTokenType { .. } => "TOKEN_WRONG_TYPE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::KeyUnavailable => error_codes::KEY_UNAVAILABLE,
            TokenError::SigningFailed { .. } => "TOKEN_SIGNING_FAILED",
        }
    }

    /// Whether the failure is the caller's (unauthenticated) rather than the server's
    pub fn is_authentication_failure(&self) -> bool {
        !matches!(
            self,
            TokenError::KeyUnavailable | TokenError::SigningFailed { .. }
        )
    }
}

impl IntoErrorResponse for TokenError {
    fn to_error_response(&self) -> ErrorResponse {
        if self.is_authentication_failure() {
            // Never leak which check failed to an untrusted client
            ErrorResponse::new(error_codes::UNAUTHORIZED, "Could not validate credentials")
        } else {
            ErrorResponse::new(self.error_code(), "Token service temporarily unavailable")
        }
    }
}

/// Key store, registry and rotation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// No persisted key material exists (first boot)
    #[error("Signing key not found at {path}")]
    NotFound { path: String },

    /// Key generation failed or was rejected
    #[error("Key generation failed: {message}")]
    GenerationFailed { message: String },

    /// Writing key material to durable storage failed
    #[error("Key persistence failed: {message}")]
    PersistenceFailed { message: String },

    /// Persisted material exists but cannot be parsed or does not form a pair
    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },

    /// A key store operation exceeded its time budget
    #[error("Key store operation '{operation}' timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    /// The registry has no current key
    #[error("No signing key available")]
    KeyUnavailable,
}

impl KeyError {
    /// Stable code for logs and metrics
    pub fn error_code(&self) -> &'static str {
        match self {
            KeyError::NotFound { .. } => "KEY_NOT_FOUND",
            KeyError::GenerationFailed { .. } => "KEY_GENERATION_FAILED",
            KeyError::PersistenceFailed { .. } => "KEY_PERSISTENCE_FAILED",
            KeyError::InvalidKeyMaterial { .. } => "KEY_INVALID_MATERIAL",
            KeyError::Timeout { .. } => "KEY_STORE_TIMEOUT",
            KeyError::KeyUnavailable => error_codes::KEY_UNAVAILABLE,
        }
    }

    /// Rotation failures the administrator can simply retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KeyError::GenerationFailed { .. }
                | KeyError::PersistenceFailed { .. }
                | KeyError::Timeout { .. }
        )
    }
}

impl IntoErrorResponse for KeyError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string())
            .add_detail("retryable", self.is_retryable())
    }
}

impl From<KeyError> for TokenError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::KeyUnavailable | KeyError::NotFound { .. } => TokenError::KeyUnavailable,
            other => TokenError::SigningFailed {
                message: other.to_string(),
            },
        }
    }
}
