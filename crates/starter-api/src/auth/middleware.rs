//! Axum용 인증 게이트.
//!
//! 보호된 라우터 앞에 [`require_auth`]를 두면 유효한 Access Token이 있는 요청만
//! 핸들러에 도달합니다. 통과한 요청에는 [`AuthenticatedUser`]가 extension으로 첨부됩니다.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(middleware::from_fn_with_state(gate, require_auth));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use super::jwt::{Claims, TokenError, TokenVerifier};
use crate::error::ApiErrorResponse;
use crate::metrics::record_auth_gate;

/// 인증된 사용자.
///
/// 게이트를 통과한 요청에서 핸들러가 추출합니다.
///
/// ```rust,ignore
/// async fn protected_handler(AuthenticatedUser(claims): AuthenticatedUser) -> String {
///     format!("Hello, {}!", claims.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

/// 인증 거부 사유. 모두 401로 응답합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("Authorization 헤더는 'Bearer <token>' 형식이어야 합니다")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

impl AuthRejection {
    pub fn code(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "MISSING_TOKEN",
            AuthRejection::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AuthRejection::TokenExpired => "TOKEN_EXPIRED",
            AuthRejection::InvalidToken => "INVALID_TOKEN",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new(self.code(), self.to_string())),
        )
            .into_response()
    }
}

/// 게이트 판정 결과. [`require_auth`]가 응답 extension으로 첨부합니다.
///
/// 값은 "allowed" 또는 [`AuthRejection::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome(pub &'static str);

/// 요청 헤더로 접근 여부를 판정하는 게이트.
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// `Authorization: Bearer <token>` 헤더를 검증합니다.
    ///
    /// 스킴 이름은 대소문자를 구분하지 않습니다.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthRejection> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthRejection::MissingToken)?;

        let value = header
            .to_str()
            .map_err(|_| AuthRejection::InvalidAuthHeader)?;

        let token = bearer_token(value).ok_or(AuthRejection::InvalidAuthHeader)?;

        match self.verifier.verify(token) {
            Ok(claims) => Ok(AuthenticatedUser(claims)),
            Err(TokenError::Expired) => {
                debug!("Rejected expired access token");
                Err(AuthRejection::TokenExpired)
            }
            Err(e) => {
                warn!(error = %e, "Rejected invalid access token");
                Err(AuthRejection::InvalidToken)
            }
        }
    }
}

/// `Bearer <token>`에서 토큰 부분 추출.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// 인증 미들웨어.
///
/// 거부 시 다음 핸들러를 호출하지 않고 즉시 401을 반환합니다.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let (outcome, mut response) = match gate.authorize(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            ("allowed", next.run(request).await)
        }
        Err(rejection) => {
            debug!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = rejection.code(),
                "Request rejected by auth gate"
            );
            (rejection.code(), rejection.into_response())
        }
    };

    record_auth_gate(outcome);
    response.extensions_mut().insert(GateOutcome(outcome));
    response
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    /// 게이트가 첨부한 사용자 정보를 꺼냅니다. 게이트 밖의 라우트에서는 `MissingToken`.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthRejection::MissingToken)
    }
}
