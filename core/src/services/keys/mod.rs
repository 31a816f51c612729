//! Signing key storage and the in-memory key registry.

mod file_store;
mod memory_store;
mod registry;
pub(crate) mod store;

#[cfg(test)]
mod tests;

pub use file_store::{FileKeyStore, ARCHIVE_DIR, METADATA_FILE, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
pub use memory_store::MemoryKeyStore;
pub use registry::{
    KeyArchive, KeyInfo, KeyRegistry, KeyRotationInfo, RegistrySnapshot, RotationSwap,
    MAX_ARCHIVED_KEYS,
};
pub use store::{generate_key_pair, KeyStore, MIN_KEY_BITS, RSA_PUBLIC_EXPONENT};

pub(crate) use store::with_timeout;
