//! Request middleware

pub mod auth;

pub use auth::{extract_token, AuthContext, JwtAuth};
