//! 인증 및 세션 토큰.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`], [`TokenIssuer`], [`TokenVerifier`]: JWT 서명/발급/검증
//! - [`AuthGate`], [`require_auth`]: 보호된 라우트 앞단의 Bearer 토큰 검사
//! - [`AuthenticatedUser`]: 게이트를 통과한 요청의 사용자 추출기
//! - Refresh Token 쿠키 헬퍼, Argon2 비밀번호 해싱
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AuthenticatedUser(claims): AuthenticatedUser) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.email)
//! }
//! ```

mod cookie;
mod jwt;
mod middleware;
mod password;

pub use cookie::{get_cookie, refresh_cookie, REFRESH_COOKIE_NAME};
pub use jwt::{
    token_services, Claims, IssuedToken, TokenCodec, TokenError, TokenIssuer, TokenKind,
    TokenVerifier, TOKEN_ALGORITHM,
};
pub use middleware::{require_auth, AuthGate, AuthRejection, AuthenticatedUser, GateOutcome};
pub use password::{
    hash_password, hash_password_blocking, verify_dummy_password_blocking, verify_password,
    verify_password_blocking, PasswordError,
};
