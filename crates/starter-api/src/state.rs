//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.
//! 요청 처리 중에 변경되는 필드는 없습니다.

use std::sync::Arc;

use starter_core::AuthConfig;

use crate::auth::{token_services, AuthGate, TokenIssuer, TokenVerifier};
use crate::repository::UserStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소
    pub store: Arc<dyn UserStore>,

    /// Access/Refresh Token 발급기
    pub issuer: TokenIssuer,

    /// 토큰 검증기 (Refresh 흐름에서 사용)
    pub verifier: TokenVerifier,

    /// 보호된 라우트 앞단의 인증 게이트
    pub gate: AuthGate,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인증 설정과 저장소로 상태를 생성합니다.
    ///
    /// 발급기, 검증기, 게이트는 같은 서명 키를 공유합니다.
    pub fn new(auth: &AuthConfig, store: Arc<dyn UserStore>) -> Self {
        let (issuer, verifier) = token_services(auth);

        Self {
            store,
            issuer,
            gate: AuthGate::new(verifier.clone()),
            verifier,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "User store ping failed");
                false
            }
        }
    }
}

/// 테스트용 상태 (메모리 저장소).
#[cfg(test)]
pub fn create_test_state() -> AppState {
    let auth = AuthConfig::with_default_ttls("test-secret-key-for-api-state")
        .expect("test auth config");
    AppState::new(&auth, Arc::new(crate::repository::MemoryUserStore::new()))
}
