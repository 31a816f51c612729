//! Rotation coordinator: generate, persist, archive, swap

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use tk_shared::config::KeyConfig;

use crate::errors::KeyError;
use crate::services::keys::{with_timeout, KeyRegistry, KeyStore};

/// Where a rotation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPhase {
    Idle,
    Generating,
    Persisting,
    Swapping,
    Failed,
}

impl fmt::Display for RotationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationPhase::Idle => "idle",
            RotationPhase::Generating => "generating",
            RotationPhase::Persisting => "persisting",
            RotationPhase::Swapping => "swapping",
            RotationPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed rotation
#[derive(Debug, Clone, Serialize)]
pub struct RotationOutcome {
    pub key_id: String,
    pub created_at: DateTime<Utc>,
    /// Key that moved from current to the archive
    pub archived_key_id: Option<String>,
    /// Keys dropped from the archive by this rotation
    pub evicted_key_ids: Vec<String>,
    /// Whether the outgoing pair was also written to the store's archive
    pub archived_on_disk: bool,
}

/// Orchestrates key rotations against a key store and a registry
///
/// Rotations are serialized. Generation and persistence complete before
/// the registry is touched, so a failure in either leaves the current key
/// in place.
pub struct RotationCoordinator {
    store: Arc<dyn KeyStore>,
    registry: Arc<KeyRegistry>,
    key_bits: usize,
    io_timeout: Duration,
    phase: Mutex<RotationPhase>,
    rotation_lock: tokio::sync::Mutex<()>,
}

impl fmt::Debug for RotationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationCoordinator")
            .field("key_bits", &self.key_bits)
            .field("io_timeout", &self.io_timeout)
            .field("phase", &self.phase())
            .finish()
    }
}

impl RotationCoordinator {
    pub fn new(store: Arc<dyn KeyStore>, registry: Arc<KeyRegistry>, config: &KeyConfig) -> Self {
        Self {
            store,
            registry,
            key_bits: config.key_bits,
            io_timeout: config.io_timeout(),
            phase: Mutex::new(RotationPhase::Idle),
            rotation_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    pub fn phase(&self) -> RotationPhase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_phase(&self, phase: RotationPhase) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = phase;
    }

    /// Replaces the current signing key with a freshly generated one
    ///
    /// # Returns
    ///
    /// * `Ok(RotationOutcome)` - New key id and creation time
    /// * `Err(KeyError::GenerationFailed)` - Generation failed or timed out
    /// * `Err(KeyError::PersistenceFailed)` - The new pair could not be stored
    pub async fn rotate_now(&self) -> Result<RotationOutcome, KeyError> {
        let _rotation = self.rotation_lock.lock().await;

        let result = self.run_rotation().await;
        match &result {
            Ok(outcome) => {
                info!(
                    key_id = %outcome.key_id,
                    archived_key_id = ?outcome.archived_key_id,
                    evicted = ?outcome.evicted_key_ids,
                    "Signing key rotated"
                );
            }
            Err(e) => {
                self.set_phase(RotationPhase::Failed);
                error!(error = %e, "Signing key rotation failed");
            }
        }

        self.set_phase(RotationPhase::Idle);
        result
    }

    async fn run_rotation(&self) -> Result<RotationOutcome, KeyError> {
        self.set_phase(RotationPhase::Generating);
        let new_pair = with_timeout("generate", self.io_timeout, self.store.generate(self.key_bits))
            .await
            .map_err(|e| match e {
                KeyError::GenerationFailed { .. } => e,
                other => KeyError::GenerationFailed {
                    message: other.to_string(),
                },
            })?;

        self.set_phase(RotationPhase::Persisting);
        with_timeout("persist", self.io_timeout, self.store.persist(&new_pair))
            .await
            .map_err(|e| match e {
                KeyError::PersistenceFailed { .. } => e,
                other => KeyError::PersistenceFailed {
                    message: other.to_string(),
                },
            })?;

        let rotated_at = Utc::now();
        let archived_on_disk = match self.registry.get_current() {
            Ok(outgoing) => {
                match with_timeout("archive", self.io_timeout, self.store.archive(&outgoing, rotated_at))
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            key_id = %outgoing.key_id(),
                            error = %e,
                            "Failed to archive outgoing key, continuing rotation"
                        );
                        false
                    }
                }
            }
            Err(_) => false,
        };

        self.set_phase(RotationPhase::Swapping);
        let key_id = new_pair.key_id().to_string();
        let created_at = new_pair.created_at();
        let swap = self.registry.rotate(new_pair);

        Ok(RotationOutcome {
            key_id,
            created_at,
            archived_key_id: swap.archived_key_id,
            evicted_key_ids: swap.evicted_key_ids,
            archived_on_disk,
        })
    }
}
