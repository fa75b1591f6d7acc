//! 공통 에러 타입.

use thiserror::Error;

/// 설정 및 시작 단계 에러.
///
/// 모두 프로세스 시작 시점에만 발생하며, 요청 처리 중에는 나타나지 않습니다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 로드/역직렬화 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 서명 키 누락 (치명적)
    #[error("서명 키가 설정되지 않았습니다. JWT_SECRET_KEY 환경 변수를 확인하세요")]
    MissingSigningSecret,

    /// 값 범위 위반
    #[error("잘못된 설정 값: {0}")]
    InvalidValue(String),
}

/// 설정 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
