//! HTTP 요청 metrics middleware.
//!
//! 라벨에는 실제 URI 대신 매칭된 라우트 템플릿(예: `/users`, `/health/ready`)을 사용하고,
//! 보호된 라우트의 응답에는 인증 게이트 판정을 함께 기록합니다.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::GateOutcome;
use crate::metrics::{record_http_duration, record_http_request, record_http_response};

/// 어떤 라우트에도 매칭되지 않은 요청의 라벨.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// 게이트를 거치지 않은 응답의 `auth` 라벨.
const NO_GATE: &str = "none";

/// 요청의 라우트 라벨.
///
/// `Router::layer`로 추가된 미들웨어에서는 라우팅이 끝난 상태이므로 [`MatchedPath`]가 있습니다.
/// 404처럼 매칭되지 않은 요청은 [`UNMATCHED_ROUTE`]로 묶어 라벨 수가 늘어나지 않게 합니다.
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// 응답에 첨부된 게이트 판정. 게이트 밖의 라우트면 "none".
pub fn gate_label(response: &Response) -> &'static str {
    response
        .extensions()
        .get::<GateOutcome>()
        .map(|outcome| outcome.0)
        .unwrap_or(NO_GATE)
}

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// - `http_requests_total` (method, route)
/// - `http_responses_total` (method, route, status, auth)
/// - `http_request_duration_seconds` (method, route)
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);

    record_http_request(&method, &route);

    let response = next.run(request).await;

    record_http_response(
        &method,
        &route,
        response.status().as_u16(),
        gate_label(&response),
    );
    record_http_duration(&method, &route, start.elapsed().as_secs_f64());

    response
}
