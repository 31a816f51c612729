//! Unit tests for KeyRegistry

use std::sync::Arc;

use tk_shared::config::KeyConfig;

use crate::domain::entities::signing_key::KeyStatus;
use crate::errors::KeyError;
use crate::services::keys::{
    KeyArchive, KeyRegistry, KeyStore, MemoryKeyStore, MAX_ARCHIVED_KEYS,
};
use crate::test_support::key_pair;

#[test]
fn test_empty_registry_has_no_current_key() {
    let registry = KeyRegistry::empty();

    assert!(!registry.is_bootstrapped());
    assert_eq!(registry.get_current().unwrap_err(), KeyError::KeyUnavailable);
    assert!(registry.find_by_id("anything").is_none());
}

#[test]
fn test_new_registry_serves_current_key() {
    let registry = KeyRegistry::new(key_pair("key_a", 0));

    let current = registry.get_current().unwrap();
    assert_eq!(current.key_id(), "key_a");
    assert_eq!(current.status(), KeyStatus::Active);
    assert_eq!(registry.archived_count(), 0);
}

#[test]
fn test_rotate_archives_outgoing_key() {
    let registry = KeyRegistry::new(key_pair("key_a", 0));

    let swap = registry.rotate(key_pair("key_b", 1));

    assert_eq!(swap.archived_key_id.as_deref(), Some("key_a"));
    assert!(swap.evicted_key_ids.is_empty());
    assert_eq!(registry.get_current().unwrap().key_id(), "key_b");

    let archived = registry.find_by_id("key_a").unwrap();
    assert_eq!(archived.status(), KeyStatus::Archived);
    assert!(archived.archived_at().is_some());
}

#[test]
fn test_archive_evicts_oldest_after_six_rotations() {
    let registry = KeyRegistry::new(key_pair("key_0", 0));

    let mut evicted = Vec::new();
    for i in 1..=6 {
        let swap = registry.rotate(key_pair(&format!("key_{}", i), i));
        evicted.extend(swap.evicted_key_ids);
    }

    assert_eq!(registry.archived_count(), MAX_ARCHIVED_KEYS);
    assert_eq!(evicted, vec!["key_0".to_string()]);
    assert!(registry.find_by_id("key_0").is_none());
    for i in 1..=5 {
        assert!(registry.find_by_id(&format!("key_{}", i)).is_some());
    }
    assert_eq!(registry.get_current().unwrap().key_id(), "key_6");
}

#[test]
fn test_rotate_into_empty_registry_installs_key() {
    let registry = KeyRegistry::empty();

    let swap = registry.rotate(key_pair("key_a", 0));

    assert!(swap.archived_key_id.is_none());
    assert_eq!(registry.get_current().unwrap().key_id(), "key_a");
    assert_eq!(registry.archived_count(), 0);
}

#[test]
fn test_install_only_fills_empty_registry() {
    let registry = KeyRegistry::empty();

    assert!(registry.install(key_pair("key_a", 0)));
    assert!(!registry.install(key_pair("key_b", 1)));
    assert_eq!(registry.get_current().unwrap().key_id(), "key_a");
}

#[test]
fn test_old_snapshot_stays_consistent_after_rotation() {
    let registry = KeyRegistry::new(key_pair("key_a", 0));
    let before = registry.snapshot();

    registry.rotate(key_pair("key_b", 1));

    assert_eq!(before.current().unwrap().key_id(), "key_a");
    assert!(before.archived().is_empty());
    assert!(before.last_rotation().is_none());

    let after = registry.snapshot();
    assert_eq!(after.current().unwrap().key_id(), "key_b");
    assert_eq!(after.archived().key_ids(), vec!["key_a".to_string()]);
}

#[test]
fn test_find_by_id_prefers_current() {
    let registry = KeyRegistry::new(key_pair("key_a", 0));
    registry.rotate(key_pair("key_b", 1));

    let found = registry.find_by_id("key_b").unwrap();
    assert!(found.is_active());
}

#[test]
fn test_archive_never_holds_duplicate_ids() {
    let mut archive = KeyArchive::new(3);

    archive.insert(Arc::new(key_pair("key_a", 0)));
    archive.insert(Arc::new(key_pair("key_b", 1)));
    archive.insert(Arc::new(key_pair("key_a", 2)));

    assert_eq!(archive.key_ids(), vec!["key_b".to_string(), "key_a".to_string()]);
}

#[test]
fn test_archive_with_custom_capacity() {
    let registry = KeyRegistry::with_capacity(key_pair("key_0", 0), 2);

    registry.rotate(key_pair("key_1", 1));
    registry.rotate(key_pair("key_2", 2));
    let swap = registry.rotate(key_pair("key_3", 0));

    assert_eq!(swap.evicted_key_ids, vec!["key_0".to_string()]);
    assert_eq!(registry.snapshot().archived().capacity(), 2);
    assert_eq!(registry.archived_count(), 2);
}

#[test]
fn test_rotation_info() {
    let registry = KeyRegistry::new(key_pair("key_a", 0));
    let info = registry.rotation_info();
    assert_eq!(info.current_key.as_ref().unwrap().key_id, "key_a");
    assert_eq!(info.archived_keys_count, 0);
    assert!(info.last_rotation.is_none());
    assert!(info.rotation_available);

    registry.rotate(key_pair("key_b", 1));
    let info = registry.rotation_info();
    assert_eq!(info.current_key.as_ref().unwrap().key_id, "key_b");
    assert_eq!(info.current_key.as_ref().unwrap().status, KeyStatus::Active);
    assert_eq!(info.archived_keys_count, 1);
    assert_eq!(info.archived_key_ids, vec!["key_a".to_string()]);
    assert!(info.last_rotation.is_some());

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["current_key"]["status"], "active");
}

#[test]
fn test_rotation_info_without_current_key() {
    let registry = KeyRegistry::empty();
    let info = registry.rotation_info();
    assert!(info.current_key.is_none());
    assert!(!info.rotation_available);

    assert!(registry.install(key_pair("key_a", 0)));
    assert!(registry.rotation_info().rotation_available);
}

#[tokio::test]
async fn test_bootstrap_loads_persisted_key() {
    let store = MemoryKeyStore::with_key(key_pair("key_persisted", 0));

    let registry = KeyRegistry::bootstrap(&store, &KeyConfig::default()).await.unwrap();

    assert_eq!(registry.get_current().unwrap().key_id(), "key_persisted");
}

#[tokio::test]
async fn test_bootstrap_generates_on_first_boot() {
    let store = MemoryKeyStore::new();

    let registry = KeyRegistry::bootstrap(&store, &KeyConfig::default()).await.unwrap();

    let current = registry.get_current().unwrap();
    assert!(current.key_id().starts_with("key_"));
    assert_eq!(store.persisted_key_id().await.as_deref(), Some(current.key_id()));
}

#[tokio::test]
async fn test_bootstrap_propagates_invalid_material() {
    struct CorruptStore;

    #[async_trait::async_trait]
    impl KeyStore for CorruptStore {
        async fn persist(&self, _: &crate::SigningKeyPair) -> Result<(), KeyError> {
            Ok(())
        }

        async fn load(&self) -> Result<crate::SigningKeyPair, KeyError> {
            Err(KeyError::InvalidKeyMaterial {
                message: "not a pem".into(),
            })
        }

        async fn archive(
            &self,
            _: &crate::SigningKeyPair,
            _: chrono::DateTime<chrono::Utc>,
        ) -> Result<(), KeyError> {
            Ok(())
        }
    }

    let result = KeyRegistry::bootstrap(&CorruptStore, &KeyConfig::default()).await;

    assert!(matches!(result, Err(KeyError::InvalidKeyMaterial { .. })));
}
