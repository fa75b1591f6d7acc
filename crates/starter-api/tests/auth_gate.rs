//! 인증 게이트 통합 테스트
//!
//! 게이트 뒤에 호출 횟수를 세는 핸들러를 두고, 거부 시 핸들러가 호출되지 않는지 확인합니다.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use chrono::{Duration, Utc};
use common::*;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use starter_api::auth::{require_auth, token_services, AuthGate, AuthenticatedUser, Claims};

async fn whoami(
    State(calls): State<Arc<AtomicUsize>>,
    user: AuthenticatedUser,
) -> (StatusCode, String) {
    calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::ACCEPTED, user.email().to_string())
}

fn gated_app() -> (Router, Arc<AtomicUsize>) {
    let (_, verifier) = token_services(&auth_config());
    let calls = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/whoami", get(whoami))
        .route_layer(middleware::from_fn_with_state(
            AuthGate::new(verifier),
            require_auth,
        ))
        .with_state(calls.clone());

    (app, calls)
}

fn request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/whoami");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn valid_token(email: &str) -> String {
    let (issuer, _) = token_services(&auth_config());
    issuer.issue_access_token(email).unwrap().token
}

async fn assert_rejected(authorization: Option<&str>, expected_code: &str) {
    let (app, calls) = gated_app();

    let response = send(&app, request(authorization)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], expected_code);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_valid_token_forwards_and_status_passes_through() {
    let (app, calls) = gated_app();
    let token = valid_token("a@x.com");

    let response = send(&app, request(Some(&format!("Bearer {}", token)))).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"a@x.com");
}

#[tokio::test]
async fn test_scheme_case_insensitive() {
    let (app, _) = gated_app();
    let token = valid_token("a@x.com");

    let response = send(&app, request(Some(&format!("bearer {}", token)))).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_missing_header() {
    assert_rejected(None, "MISSING_TOKEN").await;
}

#[tokio::test]
async fn test_header_without_bearer_scheme() {
    let token = valid_token("a@x.com");
    assert_rejected(Some(&token), "INVALID_AUTH_HEADER").await;
    assert_rejected(Some(&format!("Basic {}", token)), "INVALID_AUTH_HEADER").await;
    assert_rejected(Some("Bearer"), "INVALID_AUTH_HEADER").await;
}

#[tokio::test]
async fn test_expired_token() {
    let token = expired_token("a@x.com");
    assert_rejected(Some(&format!("Bearer {}", token)), "TOKEN_EXPIRED").await;
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let claims = Claims::new("a@x.com", Utc::now() + Duration::minutes(15));
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    assert_rejected(Some(&format!("Bearer {}", token)), "INVALID_TOKEN").await;
}

#[tokio::test]
async fn test_token_with_other_algorithm() {
    let claims = Claims::new("a@x.com", Utc::now() + Duration::minutes(15));
    let token = encode(
        &Header::new(Algorithm::HS384),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    assert_rejected(Some(&format!("Bearer {}", token)), "INVALID_TOKEN").await;
}

#[tokio::test]
async fn test_malformed_token() {
    assert_rejected(Some("Bearer not-a-token"), "INVALID_TOKEN").await;
}
