//! JWT 토큰 처리.
//!
//! - [`TokenCodec`]: HS256 서명/검증 (헤더의 알고리즘을 서명보다 먼저 확인)
//! - [`TokenIssuer`]: Access/Refresh Token 발급
//! - [`TokenVerifier`]: 서명, 알고리즘, 만료 검증 후 Claims 반환
//!
//! 두 토큰은 구조가 동일하며 발급 시 적용되는 만료 정책으로만 구분됩니다.
//! 서명 키를 교체하면 기존 토큰은 모두 무효가 됩니다 (key id 없음).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use starter_core::{AuthConfig, SigningSecret};

/// 발급/검증에 사용하는 유일한 알고리즘.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 페이로드.
///
/// 디코딩 시 알 수 없는 필드는 무시됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 식별자 (이메일)
    pub email: String,
    /// Expiration - 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// Issued At - 발급 시간 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// 식별자와 만료 시각만 담은 Claims 생성.
    pub fn new(email: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            exp: expires_at.timestamp(),
            iat: None,
        }
    }
}

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 짧은 TTL, 응답 본문으로 전달
    Access,
    /// 긴 TTL, HttpOnly 쿠키로만 전달
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// 서명 키로 Claims를 인코딩/디코딩합니다.
///
/// 디코딩은 I/O가 없는 순수 연산입니다.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Claims를 서명된 토큰 문자열로 인코딩.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// # Errors
    ///
    /// - 만료된 토큰: `TokenError::Expired`
    /// - 서명 불일치, HS256 이외의 알고리즘, 형식 오류, `exp` 누락: `TokenError::Invalid`
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

/// 발급된 토큰과 만료 시각.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access/Refresh Token 발급기.
///
/// 저장소에 접근하지 않으며 부수 효과가 없습니다.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self::with_ttls(
            codec,
            Duration::seconds(config.access_ttl_secs()),
            Duration::seconds(config.refresh_ttl_secs()),
        )
    }

    /// TTL을 직접 지정하여 생성. 설정 검증(10배 규칙)을 거치지 않습니다.
    pub fn with_ttls(codec: Arc<TokenCodec>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// 종류별 TTL.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// 지정한 종류의 토큰 발급. 만료 = 현재 + TTL.
    pub fn issue(&self, kind: TokenKind, email: &str) -> Result<IssuedToken, TokenError> {
        let expires_at = Utc::now() + self.ttl(kind);
        let token = self.codec.encode(&Claims::new(email, expires_at))?;

        tracing::debug!(kind = kind.as_str(), %expires_at, "Token issued");

        Ok(IssuedToken { token, expires_at })
    }

    pub fn issue_access_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue(TokenKind::Access, email)
    }

    pub fn issue_refresh_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue(TokenKind::Refresh, email)
    }
}

/// 토큰 검증기.
#[derive(Clone)]
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
}

impl TokenVerifier {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// 토큰을 검증하고 Claims를 반환합니다. 같은 토큰은 항상 같은 결과를 냅니다.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.codec.decode(token)
    }
}

/// 설정에서 발급기/검증기 쌍 생성. 둘은 같은 코덱을 공유합니다.
pub fn token_services(config: &AuthConfig) -> (TokenIssuer, TokenVerifier) {
    let codec = Arc::new(TokenCodec::new(config.secret()));
    (
        TokenIssuer::new(codec.clone(), config),
        TokenVerifier::new(codec),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const OTHER_SECRET: &str = "wrong-secret-key-for-testing-minimum-32-chars";

    fn config(secret: &str) -> AuthConfig {
        AuthConfig::with_default_ttls(secret).unwrap()
    }

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(config(secret).secret())
    }

    #[test]
    fn test_access_token_claims() {
        let (issuer, verifier) = token_services(&config(TEST_SECRET));
        let before = Utc::now().timestamp();

        let issued = issuer.issue_access_token("a@x.com").unwrap();
        let claims = verifier.verify(&issued.token).unwrap();

        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(claims.iat.is_none());
        let expected = before + 15 * 60;
        assert!((claims.exp - expected).abs() <= 5);
    }

    #[test]
    fn test_refresh_token_claims() {
        let (issuer, verifier) = token_services(&config(TEST_SECRET));
        let before = Utc::now().timestamp();

        let issued = issuer.issue_refresh_token("a@x.com").unwrap();
        let claims = verifier.verify(&issued.token).unwrap();

        assert_eq!(claims.email, "a@x.com");
        let expected = before + 7 * 24 * 60 * 60;
        assert!((claims.exp - expected).abs() <= 5);
    }

    #[test]
    fn test_access_ttl_shorter_than_refresh() {
        let (issuer, _) = token_services(&config(TEST_SECRET));
        assert!(issuer.ttl(TokenKind::Access) < issuer.ttl(TokenKind::Refresh));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let claims = Claims::new("a@x.com", Utc::now() + Duration::minutes(15));
        let token = codec(TEST_SECRET).encode(&claims).unwrap();

        let result = codec(OTHER_SECRET).decode(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let claims = Claims::new("a@x.com", Utc::now() - Duration::hours(1));
        let codec = codec(TEST_SECRET);
        let token = codec.encode(&claims).unwrap();

        let result = codec.decode(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        // 같은 키로 서명했지만 HS384 헤더를 가진 토큰
        let claims = Claims::new("a@x.com", Utc::now() + Duration::minutes(15));
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = codec(TEST_SECRET).decode(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let result = codec(TEST_SECRET).decode("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_missing_exp_is_invalid() {
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &serde_json::json!({ "email": "a@x.com" }),
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = codec(TEST_SECRET).decode(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &serde_json::json!({ "email": "a@x.com", "exp": exp, "role": "admin" }),
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let claims = codec(TEST_SECRET).decode(&token).unwrap();
        assert_eq!(
            claims,
            Claims {
                email: "a@x.com".to_string(),
                exp,
                iat: None,
            }
        );
    }

    #[test]
    fn test_verify_is_idempotent() {
        let (issuer, verifier) = token_services(&config(TEST_SECRET));
        let issued = issuer.issue_access_token("a@x.com").unwrap();

        let first = verifier.verify(&issued.token).unwrap();
        let second = verifier.verify(&issued.token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = codec(TEST_SECRET);
        let claims = Claims::new("a@x.com", Utc::now() + Duration::minutes(15));
        assert_eq!(codec.encode(&claims).unwrap(), codec.encode(&claims).unwrap());
    }

    proptest! {
        #[test]
        fn prop_identity_survives_issue_and_verify(email in "[a-z0-9._]{1,24}@[a-z]{1,12}\\.(com|org|io)") {
            let (issuer, verifier) = token_services(&config(TEST_SECRET));
            let issued = issuer.issue_access_token(&email).unwrap();
            let claims = verifier.verify(&issued.token).unwrap();
            prop_assert_eq!(claims.email, email);
        }
    }
}
