// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Token issuance and bearer validation over HTTP

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use std::sync::Arc;

use crate::common::{
    json_body, login_request, obtain_token, test_pipeline, test_settings, test_state, TEST_SECRET,
};
use support_rag_node::{
    auth::{TokenService, User},
    create_app, AppState,
};

const UNUSED_LLM: &str = "http://127.0.0.1:9/v1/chat/completions";

fn me_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/v1/auth/me");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = create_app(test_state(UNUSED_LLM).await);

    let response = app
        .oneshot(login_request("test@example.com", "testpassword123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = create_app(test_state(UNUSED_LLM).await);

    let response = app
        .oneshot(login_request("test@example.com", "wrong-password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = create_app(test_state(UNUSED_LLM).await);
    let token = obtain_token(&app).await;

    let response = app
        .oneshot(me_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "test@example.com");
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["full_name"], "Test User");
    assert_eq!(body["disabled"], false);
}

#[tokio::test]
async fn test_me_without_token() {
    let app = create_app(test_state(UNUSED_LLM).await);

    let response = app.oneshot(me_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = create_app(test_state(UNUSED_LLM).await);
    let tokens = TokenService::new(TEST_SECRET, "HS256").unwrap();
    let expired = tokens
        .create_access_token("test@example.com", Some(chrono::Duration::minutes(-1)))
        .unwrap();

    let response = app
        .oneshot(me_request(Some(&format!("Bearer {}", expired))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_token_for_unknown_user() {
    let app = create_app(test_state(UNUSED_LLM).await);
    let tokens = TokenService::new(TEST_SECRET, "HS256").unwrap();
    let stranger = tokens.create_access_token("someone@example.com", None).unwrap();

    let response = app
        .oneshot(me_request(Some(&format!("Bearer {}", stranger))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_disabled_user_is_inactive() {
    let mut state = AppState::new(test_settings(UNUSED_LLM), test_pipeline(UNUSED_LLM).await).unwrap();
    state.users.insert(
        User {
            username: "former@example.com".to_string(),
            email: None,
            full_name: None,
            disabled: true,
        },
        "oldpassword",
    );
    let token = state
        .tokens
        .create_access_token("former@example.com", None)
        .unwrap();
    let app = create_app(Arc::new(state));

    let response = app
        .oneshot(me_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Inactive user");
}
