//! Refresh Token 쿠키 처리.
//!
//! Refresh Token은 응답 본문에 포함되지 않고 이 쿠키로만 전달됩니다.

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};

/// Refresh Token 쿠키 이름.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// `Expires` 속성 형식 (RFC 7231 IMF-fixdate).
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Refresh Token용 `Set-Cookie` 헤더 값 생성.
///
/// 스크립트 접근 불가, HTTPS 전용, 동일 사이트 요청에만 전송되며
/// 브라우저 만료 시각은 토큰 만료와 같습니다.
///
/// # Arguments
///
/// * `token` - Refresh Token
/// * `max_age_secs` - Refresh TTL (초)
/// * `expires_at` - 토큰 만료 시각
pub fn refresh_cookie(token: &str, max_age_secs: i64, expires_at: DateTime<Utc>) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}; Expires={}",
        REFRESH_COOKIE_NAME,
        token,
        max_age_secs,
        expires_at.format(COOKIE_DATE_FORMAT)
    )
}

/// 요청의 `Cookie` 헤더에서 값 추출. 빈 값은 없는 것으로 취급합니다.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
