//! Token issuance

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::config::TokenServiceConfig;
use super::scheme::{SharedSecret, SigningScheme};
use crate::domain::entities::token::{Claims, IssuedToken, TokenKind, TokenPair};
use crate::errors::TokenError;
use crate::services::keys::KeyRegistry;

/// Builds and signs access and refresh tokens with the current registry key
///
/// Issuance only reads the registry.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    registry: Arc<KeyRegistry>,
    config: TokenServiceConfig,
    legacy_secret: SharedSecret,
}

impl TokenIssuer {
    pub fn new(registry: Arc<KeyRegistry>, config: TokenServiceConfig) -> Self {
        if config.legacy_issuance && !config.issues_legacy() {
            warn!("Legacy HS256 issuance requested without a configured secret, disabling it");
        }
        let legacy_secret = SharedSecret::new(config.jwt_secret.as_bytes());
        Self {
            registry,
            config,
            legacy_secret,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Configured lifetime for `kind`
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.config.access_token_expiry,
            TokenKind::Refresh => self.config.refresh_token_expiry,
        }
    }

    /// Issues a short-lived access token for `subject`
    pub fn issue_access(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issues a long-lived refresh token for `subject`
    pub fn issue_refresh(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue(subject, TokenKind::Refresh)
    }

    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        let scheme = self.signing_scheme()?;
        self.sign_with(&scheme, subject, kind, self.lifetime(kind), Utc::now())
    }

    /// Issues an access and a refresh token signed by the same key
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let scheme = self.signing_scheme()?;
        let now = Utc::now();

        let access = self.sign_with(
            &scheme,
            subject,
            TokenKind::Access,
            self.config.access_token_expiry,
            now,
        )?;
        let refresh = self.sign_with(
            &scheme,
            subject,
            TokenKind::Refresh,
            self.config.refresh_token_expiry,
            now,
        )?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_in: self.config.access_token_expiry.num_seconds(),
            refresh_expires_in: self.config.refresh_token_expiry.num_seconds(),
            key_id: access.key_id,
        })
    }

    /// Issues a token with an explicit lifetime relative to `now`
    #[cfg(test)]
    pub(crate) fn issue_with_expiry(
        &self,
        subject: &str,
        kind: TokenKind,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let scheme = self.signing_scheme()?;
        self.sign_with(&scheme, subject, kind, lifetime, now)
    }

    fn signing_scheme(&self) -> Result<SigningScheme, TokenError> {
        match self.registry.get_current() {
            Ok(pair) => Ok(SigningScheme::Asymmetric(pair)),
            Err(_) if self.config.issues_legacy() => {
                warn!("No signing key installed, issuing with the legacy shared secret");
                Ok(SigningScheme::Legacy(self.legacy_secret.clone()))
            }
            Err(_) => Err(TokenError::KeyUnavailable),
        }
    }

    fn sign_with(
        &self,
        scheme: &SigningScheme,
        subject: &str,
        kind: TokenKind,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(subject, kind, scheme.key_id(), now, lifetime);
        let token = scheme.sign(&claims)?;

        debug!(kind = %kind, key_id = %scheme.key_id(), "Issued token");

        Ok(IssuedToken {
            token,
            kind,
            key_id: scheme.key_id().to_string(),
            expires_at: now + lifetime,
        })
    }
}
