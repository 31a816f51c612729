//! Signing schemes: RSA key pairs and the legacy shared secret

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::entities::signing_key::SigningKeyPair;
use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

/// Key id embedded in tokens signed with the legacy secret
pub const LEGACY_KEY_ID: &str = "fallback";

/// HS256 secret shared with legacy issuers
#[derive(Clone)]
pub struct SharedSecret(Arc<Zeroizing<Vec<u8>>>);

impl SharedSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::new(Zeroizing::new(secret.as_ref().to_vec())))
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Which kind of scheme signed or verified a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    /// RS256 with a registry key
    Asymmetric,
    /// HS256 with the shared secret
    Legacy,
}

/// A key able to sign and verify tokens
#[derive(Debug, Clone)]
pub enum SigningScheme {
    Asymmetric(Arc<SigningKeyPair>),
    Legacy(SharedSecret),
}

impl SigningScheme {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SigningScheme::Asymmetric(_) => Algorithm::RS256,
            SigningScheme::Legacy(_) => Algorithm::HS256,
        }
    }

    pub fn key_id(&self) -> &str {
        match self {
            SigningScheme::Asymmetric(pair) => pair.key_id(),
            SigningScheme::Legacy(_) => LEGACY_KEY_ID,
        }
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            SigningScheme::Asymmetric(_) => SchemeKind::Asymmetric,
            SigningScheme::Legacy(_) => SchemeKind::Legacy,
        }
    }

    /// Signs `claims`; RS256 tokens also carry `kid` in the header
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let mut header = Header::new(self.algorithm());

        let result = match self {
            SigningScheme::Asymmetric(pair) => {
                header.kid = Some(pair.key_id().to_string());
                encode(&header, claims, pair.encoding_key())
            }
            SigningScheme::Legacy(secret) => encode(&header, claims, &secret.encoding_key()),
        };

        result.map_err(|e| TokenError::SigningFailed {
            message: e.to_string(),
        })
    }

    /// Checks the signature and returns the claims
    ///
    /// Expiry is not checked here; the verifier checks it after the token type.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = signature_validation(self.algorithm());

        let result = match self {
            SigningScheme::Asymmetric(pair) => decode::<Claims>(token, pair.decoding_key(), &validation),
            SigningScheme::Legacy(secret) => {
                decode::<Claims>(token, &secret.decoding_key(), &validation)
            }
        };

        result
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

fn signature_validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}
