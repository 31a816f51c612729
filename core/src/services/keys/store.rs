//! Key store abstraction and RSA key generation

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use tracing::info;

use crate::domain::entities::signing_key::SigningKeyPair;
use crate::errors::KeyError;

/// Smallest accepted RSA modulus
pub const MIN_KEY_BITS: usize = 2048;

/// Public exponent for generated keys
pub const RSA_PUBLIC_EXPONENT: u32 = 65537;

/// Durable generation and retrieval of asymmetric key material
///
/// Implementations must be safe to share between tasks; the registry and the
/// rotation coordinator hold them behind an `Arc`.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Generate a fresh key pair with a newly minted key id
    ///
    /// The default implementation generates an RSA key on the blocking pool.
    async fn generate(&self, bits: usize) -> Result<SigningKeyPair, KeyError> {
        generate_key_pair(bits).await
    }

    /// Make `pair` the persisted current key
    async fn persist(&self, pair: &SigningKeyPair) -> Result<(), KeyError>;

    /// Load the persisted current key
    ///
    /// Returns `KeyError::NotFound` when no key has been persisted yet.
    async fn load(&self) -> Result<SigningKeyPair, KeyError>;

    /// Keep a copy of an outgoing pair, named by the rotation time
    async fn archive(&self, pair: &SigningKeyPair, rotated_at: DateTime<Utc>)
        -> Result<(), KeyError>;
}

/// Generates an RSA key pair of `bits` size off the async runtime
pub async fn generate_key_pair(bits: usize) -> Result<SigningKeyPair, KeyError> {
    if bits < MIN_KEY_BITS {
        return Err(KeyError::GenerationFailed {
            message: format!(
                "RSA modulus of {} bits requested, at least {} required",
                bits, MIN_KEY_BITS
            ),
        });
    }

    tokio::task::spawn_blocking(move || generate_blocking(bits))
        .await
        .map_err(|e| KeyError::GenerationFailed {
            message: format!("Key generation task failed: {}", e),
        })?
}

pub(crate) fn generate_blocking(bits: usize) -> Result<SigningKeyPair, KeyError> {
    let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
    let private_key = RsaPrivateKey::new_with_exp(&mut OsRng, bits, &exponent).map_err(|e| {
        KeyError::GenerationFailed {
            message: format!("RSA key generation failed: {}", e),
        }
    })?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyError::GenerationFailed {
            message: format!("Failed to encode private key: {}", e),
        })?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::GenerationFailed {
            message: format!("Failed to encode public key: {}", e),
        })?;

    let created_at = Utc::now();
    let key_id = SigningKeyPair::mint_key_id(created_at);
    info!(key_id = %key_id, bits, "Generated RSA signing key pair");

    SigningKeyPair::from_pem(key_id, created_at, private_pem, public_pem)
}

/// Runs a key store operation under a time limit
pub(crate) async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, KeyError>
where
    F: Future<Output = Result<T, KeyError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(KeyError::Timeout {
            operation,
            seconds: limit.as_secs(),
        }),
    }
}
