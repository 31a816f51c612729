//! # TokenKeeper API
//!
//! actix-web boundary over the token core: bearer/cookie token extraction,
//! token refresh and the administrative key rotation endpoints.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::AppState;
