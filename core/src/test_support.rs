//! Shared fixtures for unit tests
//!
//! RSA generation dominates test time, so a few key pairs are generated once
//! per test binary and relabelled with whatever key id a test needs.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::domain::entities::signing_key::SigningKeyPair;
use crate::services::keys::store::generate_blocking;

const POOL_SIZE: usize = 3;

fn pool() -> &'static Vec<SigningKeyPair> {
    static POOL: OnceLock<Vec<SigningKeyPair>> = OnceLock::new();
    POOL.get_or_init(|| {
        (0..POOL_SIZE)
            .map(|_| generate_blocking(2048).expect("test key generation"))
            .collect()
    })
}

/// Key pair number `material` (mod pool size) relabelled as `key_id`
pub(crate) fn key_pair_with(key_id: &str, material: usize, created_at: DateTime<Utc>) -> SigningKeyPair {
    let source = &pool()[material % POOL_SIZE];
    SigningKeyPair::from_pem(
        key_id,
        created_at,
        Zeroizing::new(source.private_pem().to_string()),
        source.public_pem().to_string(),
    )
    .expect("relabel test key")
}

/// Key pair with distinct material per `material` index
pub(crate) fn key_pair(key_id: &str, material: usize) -> SigningKeyPair {
    key_pair_with(key_id, material, Utc::now())
}
