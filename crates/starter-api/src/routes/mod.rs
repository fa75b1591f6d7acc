//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/signup`, `/login`, `/refresh` - 세션 발급/갱신
//! - `/users` - 사용자 목록/삭제 (Bearer 토큰 필요)
//! - `/api-docs/openapi.json` - OpenAPI 문서

pub mod health;
pub mod session;
pub mod users;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use session::{session_router, LoginForm, SignUpForm, TokenResponse};
pub use users::{users_router, DeleteUsersResponse, UserResponse};

use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::{require_auth, AuthGate};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보호된 라우트에는 `gate`가 `route_layer`로 적용되어,
/// 매칭된 요청에만 인증을 검사합니다.
pub fn create_api_router(gate: AuthGate) -> Router<Arc<AppState>> {
    let protected =
        users_router().route_layer(middleware::from_fn_with_state(gate, require_auth));

    Router::new()
        .nest("/health", health_router())
        .merge(session_router())
        .merge(protected)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

/// 상태가 적용된 애플리케이션 라우터.
pub fn create_app(state: Arc<AppState>) -> Router {
    create_api_router(state.gate.clone()).with_state(state)
}
