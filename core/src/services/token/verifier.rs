//! Token verification across key rotations

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::decode_header;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::TokenServiceConfig;
use super::scheme::{SchemeKind, SharedSecret, SigningScheme};
use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::TokenError;
use crate::services::keys::KeyRegistry;

/// Result of a successful verification
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub kind: TokenKind,
    /// Key id claimed by the token, if any
    pub key_id: Option<String>,
    pub scheme: SchemeKind,
    pub expires_at: DateTime<Utc>,
}

/// Validates tokens against the current key, the archived keys and, when
/// enabled, the legacy shared secret
///
/// The checks run in a fixed order and stop at the first failure:
/// parse, signature, token type, expiry.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    registry: Arc<KeyRegistry>,
    config: TokenServiceConfig,
    legacy_secret: SharedSecret,
}

impl TokenVerifier {
    pub fn new(registry: Arc<KeyRegistry>, config: TokenServiceConfig) -> Self {
        if config.legacy_fallback && !config.accepts_legacy() {
            warn!("Legacy HS256 fallback requested without a configured secret, disabling it");
        }
        let legacy_secret = SharedSecret::new(config.jwt_secret.as_bytes());
        Self {
            registry,
            config,
            legacy_secret,
        }
    }

    /// Verifies `token` as `expected` and returns its subject
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        self.verify_detailed(token, expected)
            .map(|verified| verified.subject)
    }

    /// Verifies `token` as `expected`, reporting which key and scheme matched
    pub fn verify_detailed(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Verifies `token` with expiry judged at `now`
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, TokenError> {
        let result = self.check(token, expected, now);
        if let Err(e) = &result {
            debug!(reason = e.error_code(), expected = %expected, "Token rejected");
        }
        result
    }

    fn check(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, TokenError> {
        let key_id = peek_key_id(token)?;

        let (claims, scheme) = self.verify_signature(token, key_id.as_deref())?;

        if claims.kind() != Some(expected) {
            return Err(TokenError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        let expires_at = claims.expires_at().ok_or(TokenError::Malformed)?;

        Ok(VerifiedToken {
            subject: claims.sub,
            kind: expected,
            key_id,
            scheme,
            expires_at,
        })
    }

    /// Tries the registry key named by `key_id` (current when absent), then
    /// the legacy secret
    fn verify_signature(
        &self,
        token: &str,
        key_id: Option<&str>,
    ) -> Result<(Claims, SchemeKind), TokenError> {
        // One snapshot for the whole lookup so a concurrent rotation cannot
        // split current and archived
        let snapshot = self.registry.snapshot();
        let resolved = match key_id {
            Some(id) => snapshot.find_by_id(id),
            None => snapshot.current(),
        };

        if let Some(pair) = resolved {
            let scheme = SigningScheme::Asymmetric(Arc::clone(pair));
            match scheme.verify(token) {
                Ok(claims) => return Ok((claims, SchemeKind::Asymmetric)),
                Err(_) => debug!(key_id = %pair.key_id(), "RS256 verification failed"),
            }
        } else {
            debug!(key_id = ?key_id, "Key id not found in registry");
        }

        if !self.config.accepts_legacy() {
            return Err(TokenError::InvalidSignature);
        }

        let claims = SigningScheme::Legacy(self.legacy_secret.clone()).verify(token)?;
        debug!("Accepted token signed with the legacy shared secret");
        Ok((claims, SchemeKind::Legacy))
    }
}

/// Reads the signing key id without checking the signature
///
/// The `kid` claim wins over the header `kid`. Anything that is not three
/// dot-separated segments with a decodable header and claims is malformed.
fn peek_key_id(token: &str) -> Result<Option<String>, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed);
    }

    let header = decode_header(token).map_err(|_| TokenError::Malformed)?;

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

    Ok(claims.kid.or(header.kid))
}
