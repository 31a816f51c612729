//! Application state and factory
//!
//! Builds the key registry and the token services once at startup and shares
//! them with every worker through `web::Data`.

use std::sync::Arc;

use tk_core::errors::KeyError;
use tk_core::services::keys::{FileKeyStore, KeyRegistry, KeyStore};
use tk_core::services::rotation::RotationCoordinator;
use tk_core::services::token::{TokenIssuer, TokenServiceConfig, TokenVerifier};
use tk_shared::config::{AppConfig, AuthConfig, KeyConfig};

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub registry: Arc<KeyRegistry>,
    pub coordinator: Arc<RotationCoordinator>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Loads or creates the signing key under `config.keys` and wires the services
    ///
    /// Fails if the persisted key cannot be loaded; callers must not serve
    /// requests without a key.
    pub async fn bootstrap(config: &AppConfig) -> Result<Self, KeyError> {
        let store: Arc<dyn KeyStore> = Arc::new(FileKeyStore::from_config(&config.keys));
        let registry = Arc::new(KeyRegistry::bootstrap(store.as_ref(), &config.keys).await?);
        Ok(Self::from_parts(store, registry, &config.keys, config.auth.clone()))
    }

    /// Wires the services around an existing store and registry
    pub fn from_parts(
        store: Arc<dyn KeyStore>,
        registry: Arc<KeyRegistry>,
        keys: &KeyConfig,
        auth: AuthConfig,
    ) -> Self {
        let token_config = TokenServiceConfig::from(&auth.jwt);

        Self {
            issuer: Arc::new(TokenIssuer::new(Arc::clone(&registry), token_config.clone())),
            verifier: Arc::new(TokenVerifier::new(Arc::clone(&registry), token_config)),
            coordinator: Arc::new(RotationCoordinator::new(store, Arc::clone(&registry), keys)),
            registry,
            auth: Arc::new(auth),
        }
    }
}
