//! Asymmetric signing key pair entity

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::KeyError;

/// Key id given to a pair loaded from disk without a metadata sidecar
pub const INITIAL_KEY_ID: &str = "initial";

/// Lifecycle status of a signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// The key currently used for signing
    Active,
    /// A superseded key still accepted for verification
    Archived,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "active"),
            KeyStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Identity of a key pair as recorded in the metadata sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub key_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

/// An RSA key pair tagged with its identity
///
/// The private PEM is zeroized on drop and never printed; only the
/// `pub(crate)` accessors expose it to the key store and the token issuer.
#[derive(Clone)]
pub struct SigningKeyPair {
    key_id: String,
    created_at: DateTime<Utc>,
    status: KeyStatus,
    archived_at: Option<DateTime<Utc>>,
    private_pem: Zeroizing<String>,
    public_pem: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("key_id", &self.key_id)
            .field("created_at", &self.created_at)
            .field("status", &self.status)
            .field("archived_at", &self.archived_at)
            .field("private_pem", &"[REDACTED]")
            .finish()
    }
}

impl SigningKeyPair {
    /// Builds an active key pair from PEM-encoded material
    ///
    /// # Arguments
    ///
    /// * `key_id` - Identifier embedded in tokens signed by this key
    /// * `created_at` - When the pair was generated
    /// * `private_pem` - PKCS#8 (or PKCS#1) PEM private key
    /// * `public_pem` - SPKI PEM public key
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKeyPair)` - Both halves parsed
    /// * `Err(KeyError::InvalidKeyMaterial)` - Either half is not a valid RSA PEM
    pub fn from_pem(
        key_id: impl Into<String>,
        created_at: DateTime<Utc>,
        private_pem: Zeroizing<String>,
        public_pem: String,
    ) -> Result<Self, KeyError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
            KeyError::InvalidKeyMaterial {
                message: format!("Invalid private key format: {}", e),
            }
        })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
            KeyError::InvalidKeyMaterial {
                message: format!("Invalid public key format: {}", e),
            }
        })?;

        Ok(Self {
            key_id: key_id.into(),
            created_at,
            status: KeyStatus::Active,
            archived_at: None,
            private_pem,
            public_pem,
            encoding_key,
            decoding_key,
        })
    }

    /// Mints a fresh key id of the form `key_<unix-seconds>_<8 hex>`
    pub fn mint_key_id(created_at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("key_{}_{}", created_at.timestamp(), &suffix[..8])
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }

    /// Public half, safe to export
    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }

    pub(crate) fn private_pem(&self) -> &str {
        &self.private_pem
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying RS256 signatures
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns a copy of this pair marked as archived at `at`
    pub fn archived(&self, at: DateTime<Utc>) -> Self {
        let mut pair = self.clone();
        pair.status = KeyStatus::Archived;
        pair.archived_at = Some(at);
        pair
    }

    pub fn metadata(&self) -> KeyMetadata {
        KeyMetadata {
            key_id: self.key_id.clone(),
            created_at: self.created_at,
            archived_at: self.archived_at,
        }
    }

    /// Signs and verifies a sample token to prove both halves belong together
    pub fn self_test(&self) -> Result<(), KeyError> {
        let sample = serde_json::json!({
            "sub": "key-self-test",
            "exp": Utc::now().timestamp() + 60,
        });

        let token = encode(&Header::new(Algorithm::RS256), &sample, &self.encoding_key).map_err(
            |e| KeyError::InvalidKeyMaterial {
                message: format!("Self-test signing failed: {}", e),
            },
        )?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        decode::<serde_json::Value>(&token, &self.decoding_key, &validation)
            .map(|_| ())
            .map_err(|e| KeyError::InvalidKeyMaterial {
                message: format!("Private and public keys do not match: {}", e),
            })
    }
}
