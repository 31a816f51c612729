//! Shared setup for HTTP tests

use std::sync::Arc;

use tk_api::AppState;
use tk_core::services::keys::{KeyRegistry, MemoryKeyStore};
use tk_shared::config::{AdminConfig, AuthConfig, JwtConfig, KeyConfig};

pub async fn state_with_admins(admins: &[&str]) -> AppState {
    let store = Arc::new(MemoryKeyStore::new());
    let keys = KeyConfig::default();
    let registry = Arc::new(
        KeyRegistry::bootstrap(store.as_ref(), &keys)
            .await
            .expect("bootstrap registry"),
    );
    let auth = AuthConfig {
        admin: AdminConfig::new(admins.iter().copied()),
        ..AuthConfig::default()
    };
    AppState::from_parts(store, registry, &keys, auth)
}

/// State with no signing key where tokens fall back to the legacy secret
#[allow(dead_code)]
pub fn keyless_state_with_admins(admins: &[&str]) -> AppState {
    let auth = AuthConfig {
        jwt: JwtConfig::new("integration-test-secret").with_legacy_issuance(true),
        admin: AdminConfig::new(admins.iter().copied()),
        ..AuthConfig::default()
    };
    AppState::from_parts(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(KeyRegistry::empty()),
        &KeyConfig::default(),
        auth,
    )
}
