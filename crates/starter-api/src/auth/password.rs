//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 해싱 및 상수 시간 검증.
//! 해싱은 CPU를 많이 사용하므로 핸들러에서는 `*_blocking` 변형을 사용합니다.

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 존재하지 않는 사용자 검증에 쓰는 해시. 프로세스당 한 번 생성됩니다.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy-password-for-unknown-users").ok());

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호가 일치하지 않습니다")]
    Mismatch,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("해싱 작업 실행 실패: {0}")]
    TaskFailed(String),
}

/// 비밀번호 해싱.
///
/// 솔트는 자동으로 생성되므로 같은 비밀번호도 매번 다른 해시가 나옵니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// # Arguments
///
/// * `password` - 검증할 평문 비밀번호
/// * `hash` - 저장된 PHC 형식 해시
///
/// # Returns
///
/// 일치하면 `Ok(())`, 불일치하면 `PasswordError::Mismatch`.
/// 해시 자체가 손상된 경우는 `InvalidHashFormat`로 구분됩니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => PasswordError::Mismatch,
            _ => PasswordError::VerificationFailed,
        })
}

/// 블로킹 스레드 풀에서 [`hash_password`] 실행.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// 블로킹 스레드 풀에서 [`verify_password`] 실행.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// 저장된 해시 없이 검증 비용만 지불합니다.
///
/// 알 수 없는 이메일로 로그인할 때 사용하여 응답 시간이 비밀번호 불일치와 같아지도록 합니다.
/// 결과는 항상 버려집니다.
pub async fn verify_dummy_password_blocking(password: String) {
    let result = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&password, hash);
        }
    })
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, "Dummy password verification task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "TestPassword123!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).is_ok());
        assert!(matches!(
            verify_password("WrongPassword123!", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_unicode_password() {
        let password = "한글패스워드123";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("pw1".to_string()).await.unwrap();

        assert!(verify_password_blocking("pw1".to_string(), hash.clone())
            .await
            .is_ok());
        assert!(matches!(
            verify_password_blocking("pw2".to_string(), hash).await,
            Err(PasswordError::Mismatch)
        ));
    }

    #[tokio::test]
    async fn test_dummy_verification_costs_like_real_one() {
        let hash = hash_password("pw1").unwrap();
        // 해시 초기화 비용을 측정에서 제외
        verify_dummy_password_blocking("warmup".to_string()).await;

        let start = std::time::Instant::now();
        let _ = verify_password_blocking("nope".to_string(), hash).await;
        let real = start.elapsed();

        let start = std::time::Instant::now();
        verify_dummy_password_blocking("nope".to_string()).await;
        let dummy = start.elapsed();

        assert!(dummy * 4 >= real, "dummy={:?} real={:?}", dummy, real);
    }
}
