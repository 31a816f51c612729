//! Shared configuration and response types for the TokenKeeper server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (keys, JWT, admin, logging, server)
//! - Error response structures used at the HTTP boundary

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AdminConfig, AppConfig, AuthConfig, Environment, JwtConfig, KeyConfig, LogFormat,
    LoggingConfig, ServerConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
