//! API 서버 진입점.
//!
//! 설정 로드 → 로깅 → 메트릭 → DB 연결(재시도) → 마이그레이션(선택) → 서버 시작 순서로 진행합니다.
//! 서명 키가 없으면 포트 바인딩 전에 에러로 종료합니다.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use starter_api::db::Database;
use starter_api::repository::PgUserStore;
use starter_api::{create_api_router, metrics_layer, setup_metrics_recorder, AppState};
use starter_core::{init_logging, AppConfig, LogConfig};

/// 종료 시그널 이후 진행 중인 요청을 기다리는 최대 시간.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(10);

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되어 있으면 해당 origin만 허용하고
/// 자격 증명(쿠키) 전송을 허용합니다. 없으면 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let api_router = create_api_router(state.gate.clone()).with_state(state);

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().map_err(|e| {
        // 로깅 초기화 전이므로 stderr로 직접 출력
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_logging(LogConfig::from_settings(&config.logging))?;

    info!(environment = ?config.environment, "Starting API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let database_url = config.database_url()?;
    let database = Database::connect(&config.database, &database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "Unable to connect to database");
            e
        })?;

    if config.database.run_migrations {
        database.migrate().await?;
    } else {
        info!("Skipping database migrations (RUN_MIGRATION not set)");
    }

    let store = Arc::new(PgUserStore::new(database.pool().clone()));
    let state = Arc::new(AppState::new(&config.auth, store));
    info!(
        version = %state.version,
        access_ttl_minutes = config.auth.access_ttl_minutes(),
        refresh_ttl_days = config.auth.refresh_ttl_days(),
        "Application state initialized"
    );

    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let drain_deadline = async move {
        let _ = shutdown_rx.changed().await;
        tokio::time::sleep(SHUTDOWN_DRAIN).await;
    };

    tokio::select! {
        result = server => result?,
        _ = drain_deadline => {
            warn!(
                timeout_secs = SHUTDOWN_DRAIN.as_secs(),
                "In-flight requests did not finish in time, forcing shutdown"
            );
        }
    }

    database.close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
