//! Route configuration
//!
//! - `GET  /health`
//! - `POST /api/v1/auth/refresh`
//! - `GET  /api/v1/auth/me` (authenticated)
//! - `POST /api/v1/admin/rotate-keys` (administrators)
//! - `GET  /api/v1/admin/key-rotation-info` (administrators)
//! - `GET  /api/v1/admin/public-key` (administrators)

pub mod admin;
pub mod auth;
pub mod health;

use actix_web::web;

use crate::middleware::JwtAuth;

/// Registers every route; expects `web::Data<AppState>` on the app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/refresh", web::post().to(auth::refresh::refresh))
                        .service(
                            web::resource("/me")
                                .wrap(JwtAuth::new())
                                .route(web::get().to(auth::me::me)),
                        ),
                )
                .service(
                    web::scope("/admin")
                        .wrap(JwtAuth::new())
                        .route("/rotate-keys", web::post().to(admin::rotate_keys::rotate_keys))
                        .route(
                            "/key-rotation-info",
                            web::get().to(admin::rotation_info::key_rotation_info),
                        )
                        .route("/public-key", web::get().to(admin::public_key::public_key)),
                ),
        );
}
