//! 사용자 관리 endpoint.
//!
//! 인증 게이트 뒤에서만 노출됩니다.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiErrorResponse, ApiResult, AppError};
use crate::repository::UserRecord;
use crate::state::AppState;

/// 사용자 응답 (비밀번호 해시 제외).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            created_at: record.created_at,
        }
    }
}

/// 삭제 결과.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUsersResponse {
    pub deleted: u64,
}

/// 전체 사용자 목록.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "사용자 목록", body = Vec<UserResponse>),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .store
        .list()
        .await
        .map_err(AppError::internal("Failed to list users"))?;

    tracing::debug!(requested_by = %user.email(), count = users.len(), "Users listed");

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// 전체 사용자 삭제.
#[utoipa::path(
    delete,
    path = "/users",
    responses(
        (status = 200, description = "삭제된 사용자 수", body = DeleteUsersResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_users(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<DeleteUsersResponse>> {
    let deleted = state
        .store
        .delete_all()
        .await
        .map_err(AppError::internal("Failed to delete users"))?;

    info!(requested_by = %user.email(), deleted, "All users deleted");

    Ok(Json(DeleteUsersResponse { deleted }))
}

/// 사용자 라우터 생성. 인증 게이트는 호출자가 적용합니다.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/users", get(list_users).delete(delete_users))
}
