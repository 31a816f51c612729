//! # TokenKeeper Core
//!
//! Signing-key lifecycle and session token verification.
//! This crate holds the key pair entities, the key store abstraction with its
//! file and in-memory implementations, the key registry, the token issuer and
//! verifier, and the rotation coordinator.

pub mod domain;
pub mod errors;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
