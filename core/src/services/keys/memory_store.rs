//! In-memory key store for tests and ephemeral deployments

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::KeyStore;
use crate::domain::entities::signing_key::SigningKeyPair;
use crate::errors::KeyError;

/// Key store that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    current: RwLock<Option<SigningKeyPair>>,
    archived: RwLock<Vec<(DateTime<Utc>, SigningKeyPair)>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `pair` as its persisted key
    pub fn with_key(pair: SigningKeyPair) -> Self {
        Self {
            current: RwLock::new(Some(pair)),
            archived: RwLock::new(Vec::new()),
        }
    }

    pub async fn persisted_key_id(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|pair| pair.key_id().to_string())
    }

    pub async fn archived_count(&self) -> usize {
        self.archived.read().await.len()
    }

    pub async fn archived_key_ids(&self) -> Vec<String> {
        self.archived
            .read()
            .await
            .iter()
            .map(|(_, pair)| pair.key_id().to_string())
            .collect()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn persist(&self, pair: &SigningKeyPair) -> Result<(), KeyError> {
        *self.current.write().await = Some(pair.clone());
        Ok(())
    }

    async fn load(&self) -> Result<SigningKeyPair, KeyError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or_else(|| KeyError::NotFound {
                path: "memory".to_string(),
            })
    }

    async fn archive(
        &self,
        pair: &SigningKeyPair,
        rotated_at: DateTime<Utc>,
    ) -> Result<(), KeyError> {
        let mut archived = self.archived.write().await;
        archived.retain(|(at, _)| at.timestamp() != rotated_at.timestamp());
        archived.push((rotated_at, pair.archived(rotated_at)));
        Ok(())
    }
}
