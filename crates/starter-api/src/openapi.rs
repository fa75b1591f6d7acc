//! OpenAPI 문서화 설정.
//!
//! utoipa로 OpenAPI 3 문서를 생성하며 `/api-docs/openapi.json`에서 제공됩니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, DeleteUsersResponse, HealthResponse, LoginForm, SignUpForm,
    TokenResponse, UserResponse,
};

/// API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Starter API",
        description = r#"
# 토큰 기반 세션 인증 API

- **세션**: 가입/로그인 시 Access Token(본문)과 Refresh Token(HttpOnly 쿠키) 발급
- **갱신**: Refresh 쿠키로 새 Access Token 발급
- **사용자**: 보호된 사용자 관리 엔드포인트

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
만료된 토큰은 `TOKEN_EXPIRED` 코드로 구분되며, 이 경우 `/refresh`를 호출하세요.
"#
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "session", description = "세션 - 가입, 로그인, 토큰 갱신"),
        (name = "users", description = "사용자 - 목록 조회 및 삭제")
    ),
    components(
        schemas(
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            ApiErrorResponse,
            SignUpForm,
            LoginForm,
            TokenResponse,
            UserResponse,
            DeleteUsersResponse,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::session::sign_up,
        crate::routes::session::login,
        crate::routes::session::refresh,
        crate::routes::users::list_users,
        crate::routes::users::delete_users,
    ),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

/// `bearer_auth` 보안 스킴 등록.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
