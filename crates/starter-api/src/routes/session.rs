//! 세션 endpoint (가입, 로그인, 토큰 갱신).
//!
//! 가입/로그인에 성공하면 Access Token은 JSON 본문으로, Refresh Token은
//! HttpOnly 쿠키로 전달됩니다. 갱신은 Access Token만 새로 발급합니다.
//!
//! 모든 폼 필드는 검증 전에 HTML 이스케이프됩니다.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::auth::{
    get_cookie, hash_password_blocking, refresh_cookie, verify_dummy_password_blocking,
    verify_password_blocking, PasswordError, TokenKind, REFRESH_COOKIE_NAME,
};
use crate::error::{ApiErrorResponse, ApiResult, AppError};
use crate::metrics::{record_session, record_token_issued};
use crate::repository::{NewUser, StoreError};
use crate::state::AppState;
use crate::utils::{escape_html, sanitize_field};

// ==================== 요청/응답 타입 ====================

/// 가입 폼.
#[derive(Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl SignUpForm {
    fn sanitized(self) -> Self {
        Self {
            email: sanitize_field(&self.email),
            first_name: sanitize_field(&self.first_name),
            last_name: sanitize_field(&self.last_name),
            password: escape_html(&self.password),
        }
    }
}

/// 로그인 폼.
#[derive(Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl LoginForm {
    fn sanitized(self) -> Self {
        Self {
            email: sanitize_field(&self.email),
            password: escape_html(&self.password),
        }
    }
}

/// 토큰 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Access Token
    pub token: String,
}

/// 공백만 있는 값도 비어 있는 것으로 취급.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ==================== 핸들러 ====================

/// 회원 가입.
///
/// 비밀번호를 해싱하여 저장한 뒤 Access/Refresh Token을 발급합니다.
#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignUpForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "가입 성공, Refresh Token은 쿠키로 전달", body = TokenResponse,
            headers(("set-cookie" = String, description = "refresh_token=...; HttpOnly; Secure; SameSite=Strict"))),
        (status = 400, description = "필수 필드 누락", body = ApiErrorResponse),
        (status = 409, description = "이미 가입된 이메일", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    ),
    tag = "session"
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignUpForm>,
) -> ApiResult<Response> {
    let form = form.sanitized();
    if let Err(errors) = form.validate() {
        record_session("signup", "invalid");
        return Err(AppError::validation(
            "이메일, 이름, 성, 비밀번호는 비어 있을 수 없습니다",
            &errors,
        ));
    }

    let password_hash = hash_password_blocking(form.password)
        .await
        .map_err(AppError::internal("Failed to hash password"))?;

    let new_user = NewUser {
        email: form.email,
        first_name: Some(form.first_name),
        last_name: Some(form.last_name),
        password_hash,
    };

    let user = match state.store.insert(new_user).await {
        Ok(user) => user,
        Err(StoreError::Duplicate(email)) => {
            warn!(%email, "Sign-up rejected, email already registered");
            record_session("signup", "conflict");
            return Err(AppError::EmailTaken);
        }
        Err(e) => return Err(AppError::internal("Failed to persist new user")(e)),
    };

    info!(email = %user.email, id = user.id, "User signed up");

    let response = session_response(&state, &user.email)?;
    record_session("signup", "success");
    Ok(response)
}

/// 로그인.
///
/// 알 수 없는 이메일과 비밀번호 불일치는 모두 404로 응답하며,
/// 두 경우 모두 Argon2 검증을 거치므로 응답 시간으로도 구분되지 않습니다.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "로그인 성공, Refresh Token은 쿠키로 전달", body = TokenResponse,
            headers(("set-cookie" = String, description = "refresh_token=...; HttpOnly; Secure; SameSite=Strict"))),
        (status = 400, description = "필수 필드 누락", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음 또는 비밀번호 불일치", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    ),
    tag = "session"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let form = form.sanitized();
    if let Err(errors) = form.validate() {
        record_session("login", "invalid");
        return Err(AppError::validation(
            "이메일과 비밀번호는 비어 있을 수 없습니다",
            &errors,
        ));
    }

    let user = state
        .store
        .find_by_email(&form.email)
        .await
        .map_err(AppError::internal("Failed to look up user"))?;

    let user = match user {
        Some(user) if user.email == form.email => user,
        _ => {
            // 비밀번호 불일치와 같은 검증 비용을 지불한 뒤 거부
            verify_dummy_password_blocking(form.password).await;
            warn!(email = %form.email, "Login attempt for unknown email");
            record_session("login", "rejected");
            return Err(AppError::UserNotFound);
        }
    };

    match verify_password_blocking(form.password, user.password_hash.clone()).await {
        Ok(()) => {}
        Err(PasswordError::Mismatch) => {
            warn!(email = %user.email, "Login attempt with wrong password");
            record_session("login", "rejected");
            return Err(AppError::UserNotFound);
        }
        Err(e) => return Err(AppError::internal("Failed to verify password")(e)),
    }

    info!(email = %user.email, "User logged in");

    let response = session_response(&state, &user.email)?;
    record_session("login", "success");
    Ok(response)
}

/// Access Token 갱신.
///
/// Refresh Token은 재발급하지 않습니다.
#[utoipa::path(
    post,
    path = "/refresh",
    params(("refresh_token" = String, Cookie, description = "가입/로그인 시 발급된 Refresh Token")),
    responses(
        (status = 200, description = "새 Access Token", body = TokenResponse),
        (status = 401, description = "세션 없음 또는 만료, 다시 로그인 필요", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    ),
    tag = "session"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let Some(token) = get_cookie(&headers, REFRESH_COOKIE_NAME) else {
        debug!("Refresh request without refresh cookie");
        record_session("refresh", "rejected");
        return Err(AppError::MissingRefreshToken);
    };

    let claims = state.verifier.verify(&token).map_err(|e| {
        warn!(error = %e, "Refresh token rejected");
        record_session("refresh", "rejected");
        AppError::SessionEnded
    })?;

    let access = state
        .issuer
        .issue_access_token(&claims.email)
        .map_err(AppError::internal("Failed to issue access token"))?;
    record_token_issued(TokenKind::Access.as_str());

    info!(email = %claims.email, "Access token refreshed");
    record_session("refresh", "success");

    Ok(Json(TokenResponse {
        token: access.token,
    }))
}

/// Access Token 본문과 Refresh Token 쿠키를 담은 응답.
fn session_response(state: &AppState, email: &str) -> ApiResult<Response> {
    let access = state
        .issuer
        .issue_access_token(email)
        .map_err(AppError::internal("Failed to issue access token"))?;
    let refresh = state
        .issuer
        .issue_refresh_token(email)
        .map_err(AppError::internal("Failed to issue refresh token"))?;
    record_token_issued(TokenKind::Access.as_str());
    record_token_issued(TokenKind::Refresh.as_str());

    let cookie = refresh_cookie(
        &refresh.token,
        state.issuer.ttl(TokenKind::Refresh).num_seconds(),
        refresh.expires_at,
    );
    let cookie =
        HeaderValue::from_str(&cookie).map_err(AppError::internal("Failed to build refresh cookie"))?;

    let mut response = Json(TokenResponse {
        token: access.token,
    })
    .into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);

    Ok(response)
}

/// 세션 라우터 생성.
pub fn session_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}
