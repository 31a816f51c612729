//! Signing key storage configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env_or;

/// Where and how RSA signing keys are generated and stored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyConfig {
    /// Directory holding `private_key.pem`, `public_key.pem` and `archive/`
    pub keys_dir: PathBuf,

    /// RSA modulus size in bits for newly generated keys
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,

    /// Upper bound on each key store operation, in seconds
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            keys_dir: PathBuf::from("keys"),
            key_bits: default_key_bits(),
            io_timeout_secs: default_io_timeout_secs(),
        }
    }
}

impl KeyConfig {
    /// Create a key configuration rooted at `keys_dir`
    pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
            ..Default::default()
        }
    }

    /// Set the I/O timeout
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Key store operation timeout
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            keys_dir: std::env::var("KEYS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("keys")),
            key_bits: env_or("JWT_KEY_BITS", default_key_bits()),
            io_timeout_secs: env_or("KEY_IO_TIMEOUT_SECS", default_io_timeout_secs()),
        }
    }
}

fn default_key_bits() -> usize {
    2048
}

fn default_io_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_config_default() {
        let config = KeyConfig::default();
        assert_eq!(config.keys_dir, PathBuf::from("keys"));
        assert_eq!(config.key_bits, 2048);
        assert_eq!(config.io_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_io_timeout_never_zero() {
        let config = KeyConfig::new("/tmp/keys").with_io_timeout(Duration::from_millis(10));
        assert_eq!(config.io_timeout_secs, 1);
    }
}
