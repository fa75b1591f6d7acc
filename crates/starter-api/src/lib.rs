//! 토큰 기반 세션 인증 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT Access/Refresh Token 발급 및 검증
//! - 보호된 라우트용 인증 게이트
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰 코덱, 발급기, 검증기, 인증 게이트
//! - [`repository`]: 사용자 저장소
//! - [`db`]: 연결 풀 및 마이그레이션
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서

pub mod auth;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;
pub mod utils;

pub use auth::{AuthGate, AuthRejection, AuthenticatedUser, Claims, TokenIssuer, TokenVerifier};
pub use error::{ApiErrorResponse, ApiResult, AppError};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::{create_api_router, create_app};
pub use state::AppState;
