//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 동일한 JSON 형식을 반환합니다.
//!
//! ```json
//! {
//!   "code": "USER_NOT_FOUND",
//!   "message": "사용자를 찾을 수 없습니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "TOKEN_EXPIRED")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    ///
    /// # Arguments
    ///
    /// * `code` - 에러 코드
    /// * `message` - 에러 메시지
    /// * `details` - 추가 상세 정보 (JSON 값)
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러.
///
/// 세션 흐름(가입, 로그인, 갱신)과 사용자 관리 핸들러의 실패 분류입니다.
/// 내부 에러의 상세 내용은 로그에만 남고 클라이언트에는 일반 메시지만 전달됩니다.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 필수 입력 누락 (400)
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<String>,
    },

    /// 알 수 없는 이메일 또는 비밀번호 불일치 (404, 두 경우 구분 없음)
    #[error("사용자를 찾을 수 없습니다")]
    UserNotFound,

    /// 이미 가입된 이메일 (409)
    #[error("이미 가입된 이메일입니다")]
    EmailTaken,

    /// Refresh 쿠키 없음 (401)
    #[error("세션이 없습니다. 다시 로그인하세요")]
    MissingRefreshToken,

    /// Refresh Token 만료 또는 무효 (401)
    #[error("세션이 만료되었습니다. 다시 로그인하세요")]
    SessionEnded,

    /// 저장소, 해싱, 토큰 서명 실패 (500)
    #[error("서버 내부 오류가 발생했습니다")]
    Internal,
}

impl AppError {
    /// 필드 검증 에러 생성.
    pub fn validation(message: impl Into<String>, errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();

        AppError::Validation {
            message: message.into(),
            fields,
        }
    }

    /// 원인을 로그에 남기고 `Internal`로 변환하는 클로저.
    ///
    /// ```rust,ignore
    /// store.list().await.map_err(AppError::internal("Failed to list users"))?;
    /// ```
    pub fn internal<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> AppError {
        move |err| {
            tracing::error!(error = %err, "{}", context);
            AppError::Internal
        }
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::MissingRefreshToken | AppError::SessionEnded => StatusCode::UNAUTHORIZED,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::EmailTaken => "EMAIL_TAKEN",
            AppError::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            AppError::SessionEnded => "SESSION_ENDED",
            AppError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Validation { fields, .. } => ApiErrorResponse::with_details(
                self.code(),
                self.to_string(),
                serde_json::json!({ "fields": fields }),
            ),
            _ => ApiErrorResponse::new(self.code(), self.to_string()),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_json_serialization() {
        let error = ApiErrorResponse::new("NOT_FOUND", "Resource not found");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("timestamp"));
        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"NOT_FOUND""#));
        assert!(json.contains(r#""message":"Resource not found""#));
    }

    #[test]
    fn test_app_error_status_mapping() {
        assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailTaken.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::SessionEnded.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::MissingRefreshToken.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_hides_cause() {
        let err = AppError::internal("Failed to query")("connection refused: 10.0.0.5");
        assert!(matches!(err, AppError::Internal));
        assert!(!err.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let err = AppError::Validation {
            message: "입력값이 비어 있습니다".to_string(),
            fields: vec!["email".to_string(), "password".to_string()],
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["fields"][0], "email");
    }
}
