//! Users Repository
//!
//! 사용자 계정 저장소. 세션 흐름은 [`UserStore`] 트레이트에만 의존하며,
//! 운영에서는 [`PgUserStore`], 테스트에서는 [`MemoryUserStore`](super::MemoryUserStore)를 사용합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 레코드
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[sqlx(default)]
    pub first_name: Option<String>,
    #[sqlx(default)]
    pub last_name: Option<String>,
    /// PHC 형식 비밀번호 해시
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 새 사용자 입력
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
}

/// 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("이미 존재하는 이메일: {0}")]
    Duplicate(String),
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
}

// ================================================================================================
// Store trait
// ================================================================================================

/// 사용자 저장소 추상화.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 조회 (정확히 일치)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// 사용자 추가. 이메일이 이미 있으면 `StoreError::Duplicate`.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// 전체 사용자 (id 순)
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// 전체 사용자 삭제, 삭제된 행 수 반환
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// 저장소 연결 확인
    async fn ping(&self) -> Result<(), StoreError>;
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

const USER_COLUMNS: &str = "id, email, first_name, last_name, password, created_at";

/// PostgreSQL 사용자 저장소
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, password)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Duplicate(user.email.clone())
            }
            other => StoreError::Database(other),
        })?;

        tx.commit().await?;

        info!(email = %record.email, id = record.id, "User inserted");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM users").execute(&mut *tx).await?;

        tx.commit().await?;

        info!(count = result.rows_affected(), "All users deleted");
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
