//! Thread-safe registry of the current signing key and its recent predecessors

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use tk_shared::config::KeyConfig;

use super::store::{with_timeout, KeyStore};
use crate::domain::entities::signing_key::{KeyStatus, SigningKeyPair};
use crate::errors::KeyError;

/// Number of superseded keys kept for verification
pub const MAX_ARCHIVED_KEYS: usize = 5;

/// Bounded history of archived keys, oldest at the front
#[derive(Debug, Clone)]
pub struct KeyArchive {
    keys: VecDeque<Arc<SigningKeyPair>>,
    capacity: usize,
}

impl KeyArchive {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `key` as the most recent entry and returns the evicted ones
    ///
    /// An existing entry with the same key id is replaced.
    pub fn insert(&mut self, key: Arc<SigningKeyPair>) -> Vec<Arc<SigningKeyPair>> {
        self.keys.retain(|k| k.key_id() != key.key_id());
        self.keys.push_back(key);

        let mut evicted = Vec::new();
        while self.keys.len() > self.capacity {
            if let Some(oldest) = self.keys.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Most recent match first
    pub fn find(&self, key_id: &str) -> Option<&Arc<SigningKeyPair>> {
        self.keys.iter().rev().find(|k| k.key_id() == key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SigningKeyPair>> {
        self.keys.iter()
    }

    pub fn key_ids(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.key_id().to_string()).collect()
    }
}

/// Immutable view of the registry at one instant
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    current: Option<Arc<SigningKeyPair>>,
    archived: KeyArchive,
    last_rotation: Option<DateTime<Utc>>,
}

impl RegistrySnapshot {
    fn empty(capacity: usize) -> Self {
        Self {
            current: None,
            archived: KeyArchive::new(capacity),
            last_rotation: None,
        }
    }

    pub fn current(&self) -> Option<&Arc<SigningKeyPair>> {
        self.current.as_ref()
    }

    pub fn archived(&self) -> &KeyArchive {
        &self.archived
    }

    pub fn last_rotation(&self) -> Option<DateTime<Utc>> {
        self.last_rotation
    }

    /// Current key first, then archived keys from most recent to oldest
    pub fn find_by_id(&self, key_id: &str) -> Option<&Arc<SigningKeyPair>> {
        self.current
            .as_ref()
            .filter(|k| k.key_id() == key_id)
            .or_else(|| self.archived.find(key_id))
    }
}

/// Public description of a key
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_id: String,
    pub created_at: DateTime<Utc>,
    pub status: KeyStatus,
}

impl From<&SigningKeyPair> for KeyInfo {
    fn from(pair: &SigningKeyPair) -> Self {
        Self {
            key_id: pair.key_id().to_string(),
            created_at: pair.created_at(),
            status: pair.status(),
        }
    }
}

/// Registry introspection for administrators
#[derive(Debug, Clone, Serialize)]
pub struct KeyRotationInfo {
    pub current_key: Option<KeyInfo>,
    pub archived_keys_count: usize,
    pub archived_key_ids: Vec<String>,
    pub last_rotation: Option<DateTime<Utc>>,
    pub rotation_available: bool,
}

/// What a registry swap changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationSwap {
    /// Id of the key that moved from current to archived
    pub archived_key_id: Option<String>,
    /// Ids dropped from the archive, oldest first
    pub evicted_key_ids: Vec<String>,
}

/// Holder of the current signing key plus a bounded archive
///
/// Reads load an `Arc<RegistrySnapshot>` without locking. Writers build a
/// complete new snapshot under `write_lock` and publish it with one store, so
/// a reader sees either the state before a rotation or after it.
pub struct KeyRegistry {
    snapshot: ArcSwap<RegistrySnapshot>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.load();
        f.debug_struct("KeyRegistry")
            .field("current", &snapshot.current.as_ref().map(|k| k.key_id().to_string()))
            .field("archived", &snapshot.archived.key_ids())
            .finish()
    }
}

impl KeyRegistry {
    /// Creates a registry whose current key is `key`
    pub fn new(key: SigningKeyPair) -> Self {
        Self::with_capacity(key, MAX_ARCHIVED_KEYS)
    }

    pub fn with_capacity(key: SigningKeyPair, capacity: usize) -> Self {
        let registry = Self::empty_with_capacity(capacity);
        registry.install(key);
        registry
    }

    /// Creates a registry with no current key
    ///
    /// Issuance fails with `KeyUnavailable` until a key is installed.
    pub fn empty() -> Self {
        Self::empty_with_capacity(MAX_ARCHIVED_KEYS)
    }

    pub fn empty_with_capacity(capacity: usize) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::empty(capacity)),
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the persisted key, generating and persisting one on first boot
    ///
    /// Any failure other than a missing key is returned to the caller; the
    /// process must not serve tokens without a usable key.
    pub async fn bootstrap<S>(store: &S, config: &KeyConfig) -> Result<Self, KeyError>
    where
        S: KeyStore + ?Sized,
    {
        let limit = config.io_timeout();

        match with_timeout("load", limit, store.load()).await {
            Ok(pair) => {
                info!(
                    key_id = %pair.key_id(),
                    created_at = %pair.created_at(),
                    "Loaded signing key"
                );
                Ok(Self::new(pair))
            }
            Err(KeyError::NotFound { path }) => {
                info!(
                    path = %path,
                    bits = config.key_bits,
                    "No signing key found, generating a new key pair"
                );
                let pair = with_timeout("generate", limit, store.generate(config.key_bits)).await?;
                with_timeout("persist", limit, store.persist(&pair)).await?;
                info!(key_id = %pair.key_id(), "Initial signing key ready");
                Ok(Self::new(pair))
            }
            Err(e) => {
                error!(error = %e, "Failed to load signing key");
                Err(e)
            }
        }
    }

    /// Returns the key used for signing
    pub fn get_current(&self) -> Result<Arc<SigningKeyPair>, KeyError> {
        self.snapshot
            .load()
            .current
            .clone()
            .ok_or(KeyError::KeyUnavailable)
    }

    /// Looks up a key by id, current first then archived newest to oldest
    pub fn find_by_id(&self, key_id: &str) -> Option<Arc<SigningKeyPair>> {
        self.snapshot.load().find_by_id(key_id).cloned()
    }

    /// A consistent view for callers that read more than one field
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.snapshot.load().current.is_some()
    }

    pub fn archived_count(&self) -> usize {
        self.snapshot.load().archived.len()
    }

    /// Installs `key` as current if the registry has none
    ///
    /// Returns `false` and leaves the registry unchanged when a current key
    /// already exists; use [`KeyRegistry::rotate`] to replace it.
    pub fn install(&self, key: SigningKeyPair) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let previous = self.snapshot.load_full();
        if previous.current.is_some() {
            return false;
        }

        self.snapshot.store(Arc::new(RegistrySnapshot {
            current: Some(Arc::new(key)),
            archived: previous.archived.clone(),
            last_rotation: previous.last_rotation,
        }));
        true
    }

    /// Makes `new_key` current, archiving the outgoing key
    ///
    /// The archive keeps at most its capacity; the oldest entries are evicted.
    pub fn rotate(&self, new_key: SigningKeyPair) -> RotationSwap {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let previous = self.snapshot.load_full();
        let now = Utc::now();

        let mut archived = previous.archived.clone();
        let mut swap = RotationSwap::default();

        if let Some(outgoing) = previous.current.as_ref() {
            if outgoing.key_id() != new_key.key_id() {
                swap.archived_key_id = Some(outgoing.key_id().to_string());
                swap.evicted_key_ids = archived
                    .insert(Arc::new(outgoing.archived(now)))
                    .iter()
                    .map(|k| k.key_id().to_string())
                    .collect();
            }
        }

        self.snapshot.store(Arc::new(RegistrySnapshot {
            current: Some(Arc::new(new_key)),
            archived,
            last_rotation: Some(now),
        }));

        swap
    }

    /// Summary of the registry for administrators
    pub fn rotation_info(&self) -> KeyRotationInfo {
        let snapshot = self.snapshot.load();
        KeyRotationInfo {
            current_key: snapshot.current.as_deref().map(KeyInfo::from),
            archived_keys_count: snapshot.archived.len(),
            archived_key_ids: snapshot.archived.key_ids(),
            last_rotation: snapshot.last_rotation,
            rotation_available: snapshot.current.is_some(),
        }
    }
}
