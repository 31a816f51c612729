//! Token issuance and verification.

mod config;
mod issuer;
mod scheme;
mod verifier;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use scheme::{SchemeKind, SharedSecret, SigningScheme, LEGACY_KEY_ID};
pub use verifier::{TokenVerifier, VerifiedToken};
