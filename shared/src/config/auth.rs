//! Authentication configuration: token lifetimes, the legacy shared secret,
//! cookie extraction and administrative access

use serde::{Deserialize, Serialize};

use super::env_or;

/// Placeholder secret used when `JWT_SECRET_KEY` is unset
///
/// It is public knowledge, so the legacy scheme never runs with it.
pub const DEFAULT_LEGACY_SECRET: &str = "development-secret-please-change-in-production";

/// JWT issuance and verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared secret for the legacy HS256 scheme
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Accept HS256 tokens signed with the legacy secret when no RSA key verifies
    #[serde(default = "default_true")]
    pub legacy_fallback: bool,

    /// Sign with the legacy secret when no RSA key is installed
    #[serde(default)]
    pub legacy_issuance: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_LEGACY_SECRET),
            access_token_expiry: 1800,    // 30 minutes
            refresh_token_expiry: 604800, // 7 days
            legacy_fallback: true,
            legacy_issuance: false,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with a legacy secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Enable or disable the HS256 verification fallback
    pub fn with_legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = enabled;
        self
    }

    /// Enable or disable HS256 issuance when no RSA key is available
    pub fn with_legacy_issuance(mut self, enabled: bool) -> Self {
        self.legacy_issuance = enabled;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        is_default_secret(&self.secret)
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET_KEY")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .unwrap_or(defaults.secret);

        Self {
            secret,
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRE_MINUTES", 30i64) * 60,
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRE_DAYS", 7i64) * 86400,
            legacy_fallback: env_or("JWT_LEGACY_FALLBACK", defaults.legacy_fallback),
            legacy_issuance: env_or("JWT_LEGACY_ISSUANCE", defaults.legacy_issuance),
        }
    }
}

/// Administrative endpoint access
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Subjects allowed to call administrative endpoints
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl AdminConfig {
    /// Create an admin configuration from a list of subjects
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subjects: subjects.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a verified subject may use administrative endpoints
    pub fn is_admin(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Reads `ADMIN_SUBJECTS` as a comma-separated list
    pub fn from_env() -> Self {
        let raw = std::env::var("ADMIN_SUBJECTS").unwrap_or_default();
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Administrative access
    #[serde(default)]
    pub admin: AdminConfig,

    /// Name of the httpOnly cookie that may carry the access token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            admin: AdminConfig::default(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            admin: AdminConfig::from_env(),
            cookie_name: std::env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| default_cookie_name()),
        }
    }
}

/// True for secrets the legacy scheme must refuse: empty or the published default
pub fn is_default_secret(secret: &str) -> bool {
    secret.is_empty() || secret == DEFAULT_LEGACY_SECRET
}

fn default_true() -> bool {
    true
}

fn default_cookie_name() -> String {
    String::from("access_token")
}
