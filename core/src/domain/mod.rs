//! Domain layer containing signing keys and token entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{
    Claims, IssuedToken, KeyMetadata, KeyStatus, SigningKeyPair, TokenKind, TokenPair,
    INITIAL_KEY_ID,
};
