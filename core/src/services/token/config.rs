//! Configuration for token issuance and verification

use chrono::Duration;
use tk_shared::config::{is_default_secret, JwtConfig};

/// Configuration for the token issuer and verifier
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Shared secret for the legacy HS256 scheme
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_token_expiry: Duration,
    /// Refresh token lifetime
    pub refresh_token_expiry: Duration,
    /// Accept HS256 tokens signed with `jwt_secret`
    ///
    /// Ignored while `jwt_secret` is empty or the published default.
    pub legacy_fallback: bool,
    /// Sign with `jwt_secret` when no RSA key is installed
    ///
    /// Ignored while `jwt_secret` is empty or the published default.
    pub legacy_issuance: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            jwt_secret: config.secret.clone(),
            access_token_expiry: Duration::seconds(config.access_token_expiry),
            refresh_token_expiry: Duration::seconds(config.refresh_token_expiry),
            legacy_fallback: config.legacy_fallback && !config.is_using_default_secret(),
            legacy_issuance: config.legacy_issuance && !config.is_using_default_secret(),
        }
    }
}

impl TokenServiceConfig {
    /// Whether HS256 tokens are accepted after every registry key fails
    pub fn accepts_legacy(&self) -> bool {
        self.legacy_fallback && !is_default_secret(&self.jwt_secret)
    }

    /// Whether an empty registry falls back to HS256 issuance
    pub fn issues_legacy(&self) -> bool {
        self.legacy_issuance && !is_default_secret(&self.jwt_secret)
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn with_legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = enabled;
        self
    }

    pub fn with_legacy_issuance(mut self, enabled: bool) -> Self {
        self.legacy_issuance = enabled;
        self
    }

    pub fn with_access_expiry(mut self, lifetime: Duration) -> Self {
        self.access_token_expiry = lifetime;
        self
    }
}
