//! Integration tests for the key administration endpoints

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::Value;
use tk_api::routes;

use common::{keyless_state_with_admins, state_with_admins};

#[actix_web::test]
async fn test_rotate_requires_authentication() {
    let state = state_with_admins(&["admin-1"]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/rotate-keys")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_rotate_forbidden_for_non_admin() {
    let state = state_with_admins(&["admin-1"]).await;
    let token = state.issuer.issue_access("user-42").unwrap().token;
    let before = state.registry.get_current().unwrap().key_id().to_string();
    let registry = state.registry.clone();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/rotate-keys")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(registry.get_current().unwrap().key_id(), before);
}

#[actix_web::test]
async fn test_admin_rotation_keeps_old_tokens_valid() {
    let state = state_with_admins(&["admin-1"]).await;
    let admin_token = state.issuer.issue_access("admin-1").unwrap();
    let user_token = state.issuer.issue_access("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/rotate-keys")
        .insert_header(("Authorization", format!("Bearer {}", admin_token.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["archived_key_id"], admin_token.key_id.as_str());
    assert_ne!(body["key_id"], admin_token.key_id.as_str());

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", user_token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["subject"], "user-42");
}

#[actix_web::test]
async fn test_key_rotation_info() {
    let state = state_with_admins(&["admin-1"]).await;
    let admin_token = state.issuer.issue_access("admin-1").unwrap();
    state.coordinator.rotate_now().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/key-rotation-info")
        .insert_header(("Authorization", format!("Bearer {}", admin_token.token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["archived_keys_count"], 1);
    assert_eq!(body["archived_key_ids"][0], admin_token.key_id.as_str());
    assert_eq!(body["current_key"]["status"], "active");
    assert_eq!(body["rotation_available"], true);
    assert_eq!(body["rotation_phase"], "idle");
    assert!(body["last_rotation"].is_string());
}

#[actix_web::test]
async fn test_public_key_export() {
    let state = state_with_admins(&["admin-1"]).await;
    let admin_token = state.issuer.issue_access("admin-1").unwrap();
    let current = state.registry.get_current().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/public-key")
        .insert_header(("Authorization", format!("Bearer {}", admin_token.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["algorithm"], "RS256");
    assert_eq!(body["key_id"], current.key_id());
    assert_eq!(body["public_key"], current.public_pem());
    assert!(body["public_key"]
        .as_str()
        .unwrap()
        .starts_with("-----BEGIN PUBLIC KEY-----"));
    assert!(!body["public_key"].as_str().unwrap().contains("PRIVATE"));
}

#[actix_web::test]
async fn test_public_key_forbidden_for_non_admin() {
    let state = state_with_admins(&["admin-1"]).await;
    let token = state.issuer.issue_access("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/public-key")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_public_key_without_signing_key_is_500() {
    let state = keyless_state_with_admins(&["admin-1"]);
    let admin_token = state.issuer.issue_access("admin-1").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/public-key")
        .insert_header(("Authorization", format!("Bearer {}", admin_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
