//! Request and response bodies

pub mod admin_dto;
pub mod auth_dto;

pub use admin_dto::{KeyRotationInfoResponse, KeyRotationResponse, PublicKeyResponse};
pub use auth_dto::{RefreshTokenRequest, SubjectResponse, TokenResponse};
