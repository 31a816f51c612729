//! Integration tests for token extraction, verification and refresh

mod common;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tk_api::routes;

use common::state_with_admins;

#[actix_web::test]
async fn test_me_requires_token() {
    let state = state_with_admins(&[]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn test_me_with_bearer_token() {
    let state = state_with_admins(&[]).await;
    let token = state.issuer.issue_access("user-42").unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token.token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["subject"], "user-42");
    assert_eq!(body["key_id"], token.key_id.as_str());
}

#[actix_web::test]
async fn test_me_with_cookie_token() {
    let state = state_with_admins(&[]).await;
    let token = state.issuer.issue_access("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .cookie(Cookie::new("access_token", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_header_wins_over_cookie() {
    let state = state_with_admins(&[]).await;
    let token = state.issuer.issue_access("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .cookie(Cookie::new("access_token", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_rejections_are_indistinguishable() {
    let state = state_with_admins(&[]).await;
    let refresh = state.issuer.issue_refresh("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let mut messages = Vec::new();
    for token in ["garbage", "a.b.c", refresh.as_str()] {
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        messages.push(body["message"].clone());
    }

    assert!(messages.iter().all(|m| m == &messages[0]));
}

#[actix_web::test]
async fn test_refresh_issues_new_pair() {
    let state = state_with_admins(&[]).await;
    let refresh = state.issuer.issue_refresh("user-42").unwrap().token;
    let verifier = state.verifier.clone();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);
    let access = body["access_token"].as_str().unwrap();
    assert_eq!(
        verifier
            .verify(access, tk_core::domain::entities::token::TokenKind::Access)
            .unwrap(),
        "user-42"
    );
}

#[actix_web::test]
async fn test_refresh_rejects_access_token() {
    let state = state_with_admins(&[]).await;
    let access = state.issuer.issue_access("user-42").unwrap().token;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_health_reports_key_loaded() {
    let state = state_with_admins(&[]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["signing_key_loaded"], true);
}
