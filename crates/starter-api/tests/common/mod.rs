//! 통합 테스트 공용 헬퍼

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, header::SET_COOKIE, Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use starter_api::auth::{Claims, TokenCodec};
use starter_api::repository::MemoryUserStore;
use starter_api::{create_app, AppState};
use starter_core::AuthConfig;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-key-minimum-32-chars";

pub fn auth_config() -> AuthConfig {
    AuthConfig::with_default_ttls(TEST_SECRET).unwrap()
}

/// 메모리 저장소를 사용하는 전체 애플리케이션
pub fn test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        &auth_config(),
        Arc::new(MemoryUserStore::new()),
    ));
    (create_app(state.clone()), state)
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// `Set-Cookie`에서 `refresh_token=<value>` 쌍만 추출
pub fn refresh_cookie_pair(response: &Response<Body>) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("refresh cookie must be set")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().trim().to_string()
}

pub async fn sign_up(app: &Router, email: &str, password: &str) -> Response<Body> {
    let body = format!(
        "email={}&first_name=A&last_name=X&password={}",
        email.replace('@', "%40"),
        password
    );
    send(app, form_post("/signup", &body)).await
}

pub async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    let body = format!("email={}&password={}", email.replace('@', "%40"), password);
    send(app, form_post("/login", &body)).await
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(auth_config().secret())
}

/// 1시간 전에 만료된 토큰
pub fn expired_token(email: &str) -> String {
    codec()
        .encode(&Claims::new(email, Utc::now() - Duration::hours(1)))
        .unwrap()
}
