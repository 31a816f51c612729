//! Domain entities representing signing keys and session tokens.

pub mod signing_key;
pub mod token;


// Re-export commonly used types
pub use signing_key::{KeyMetadata, KeyStatus, SigningKeyPair, INITIAL_KEY_ID};
pub use token::{Claims, IssuedToken, TokenKind, TokenPair};
