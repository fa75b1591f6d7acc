//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`.
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, route: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "route" => route.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
///
/// `auth`는 인증 게이트 판정 ("allowed", 거부 코드) 또는 게이트 밖의 라우트면 "none".
pub fn record_http_response(method: &str, route: &str, status: u16, auth: &'static str) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string(),
        "auth" => auth
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, route: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 인증 게이트 판정 카운터.
///
/// `outcome`은 "allowed" 또는 거부 코드 (예: "TOKEN_EXPIRED").
pub fn record_auth_gate(outcome: &'static str) {
    counter!("auth_gate_decisions_total", "outcome" => outcome).increment(1);
}

/// 세션 흐름 결과 카운터.
///
/// `flow`는 "signup", "login", "refresh" 중 하나.
pub fn record_session(flow: &'static str, outcome: &'static str) {
    counter!("auth_sessions_total", "flow" => flow, "outcome" => outcome).increment(1);
}

/// 발급된 토큰 수.
pub fn record_token_issued(kind: &'static str) {
    counter!("auth_tokens_issued_total", "kind" => kind).increment(1);
}
