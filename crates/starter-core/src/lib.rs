//! # Starter Core
//!
//! 스타터 백엔드 전반에서 공유되는 기반 타입을 제공합니다.
//!
//! - 설정 관리 (기본값 → 설정 파일 → 환경 변수 순서로 병합)
//! - 서명 키 래퍼 ([`SigningSecret`])
//! - 로깅 인프라
//! - 공통 에러 타입

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;
