//! Business services: key storage, token issuance/verification and rotation.

pub mod keys;
pub mod rotation;
pub mod token;

// Re-export commonly used types
pub use keys::{FileKeyStore, KeyRegistry, KeyRotationInfo, KeyStore, MemoryKeyStore};
pub use rotation::{RotationCoordinator, RotationOutcome, RotationPhase};
pub use token::{TokenIssuer, TokenServiceConfig, TokenVerifier, VerifiedToken};
