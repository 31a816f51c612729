use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tk_core::domain::entities::signing_key::SigningKeyPair;
use tk_core::services::keys::KeyRotationInfo;
use tk_core::services::rotation::{RotationOutcome, RotationPhase};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRotationResponse {
    pub success: bool,
    pub message: String,
    pub key_id: String,
    pub created_at: DateTime<Utc>,
    pub archived_key_id: Option<String>,
    pub evicted_key_ids: Vec<String>,
}

impl From<RotationOutcome> for KeyRotationResponse {
    fn from(outcome: RotationOutcome) -> Self {
        Self {
            success: true,
            message: "JWT signing keys rotated successfully".to_string(),
            key_id: outcome.key_id,
            created_at: outcome.created_at,
            archived_key_id: outcome.archived_key_id,
            evicted_key_ids: outcome.evicted_key_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyRotationInfoResponse {
    #[serde(flatten)]
    pub info: KeyRotationInfo,
    pub rotation_phase: RotationPhase,
}

/// Current verification key in SPKI PEM form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
    pub algorithm: String,
    pub key_id: String,
}

impl From<&SigningKeyPair> for PublicKeyResponse {
    fn from(pair: &SigningKeyPair) -> Self {
        Self {
            public_key: pair.public_pem().to_string(),
            algorithm: "RS256".to_string(),
            key_id: pair.key_id().to_string(),
        }
    }
}
