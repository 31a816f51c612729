//! Configuration module with concern-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token lifetimes, legacy secret, cookie and admin settings
//! - `environment` - Environment detection and logging configuration
//! - `keys` - Signing key storage and generation settings
//! - `server` - HTTP server configuration

pub mod auth;
pub mod environment;
pub mod keys;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{is_default_secret, AdminConfig, AuthConfig, JwtConfig, DEFAULT_LEGACY_SECRET};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use keys::KeyConfig;
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Signing key configuration
    #[serde(default)]
    pub keys: KeyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            keys: KeyConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            server: ServerConfig::from_env(),
            auth: AuthConfig::from_env(),
            keys: KeyConfig::from_env(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

/// Reads an environment variable and parses it, falling back to `default`
/// when the variable is unset or unparseable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.keys.key_bits, 2048);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("TK_SHARED_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("TK_SHARED_TEST_GARBAGE", 42u64), 42);
        std::env::set_var("TK_SHARED_TEST_GARBAGE", " 7 ");
        assert_eq!(env_or("TK_SHARED_TEST_GARBAGE", 42u64), 7);
        std::env::remove_var("TK_SHARED_TEST_GARBAGE");
    }
}
