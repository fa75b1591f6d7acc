//! 데이터베이스 연결 풀.
//!
//! 시작 시 DB가 아직 준비되지 않았을 수 있으므로 풀 생성과 핑을
//! 제곱 백오프(1초, 4초, 9초, ...)로 재시도합니다.

use std::future::Future;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use starter_core::DatabaseConfig;
use tracing::{info, warn};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 연결 풀을 생성하고 핑으로 확인합니다.
    ///
    /// # Arguments
    ///
    /// * `config` - 풀 크기, 타임아웃, 재시도 횟수
    /// * `url` - 연결 문자열
    pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<Self, sqlx::Error> {
        info!("Connecting to database...");

        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs));

        let pool = with_retries(config.connect_attempts, "Database connection", || {
            options.clone().connect(url)
        })
        .await?;

        let database = Self { pool };
        with_retries(config.connect_attempts, "Database ping", || {
            database.health_check()
        })
        .await?;

        info!("Database connection established");
        Ok(database)
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations").run(&self.pool).await?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 풀을 닫고 진행 중인 연결이 반환될 때까지 대기합니다.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// 실패 시 `attempt²`초 대기 후 최대 `attempts`번까지 재시도합니다.
pub async fn with_retries<T, E, F, Fut>(attempts: u32, what: &str, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = Duration::from_secs(u64::from(attempt) * u64::from(attempt));
                warn!(
                    attempt,
                    max_attempts = attempts,
                    retry_in_secs = delay.as_secs(),
                    error = %e,
                    "{} failed, retrying",
                    what
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
