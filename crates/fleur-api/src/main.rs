//! FleurMarket API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 가입/로그인, JWT 인증, 역할 기반 접근 제어 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use fleur_api::auth::AuthContext;
use fleur_api::config::AppConfig;
use fleur_api::routes::create_api_router;
use fleur_api::seed;
use fleur_api::state::AppState;
use fleur_api::store::{CredentialStore, PgCredentialStore};

/// CORS 미들웨어 구성.
///
/// `CORS_ORIGINS` 환경변수가 설정되어 있으면 해당 origin만 허용하고,
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, auth_ctx: AuthContext) -> Router {
    create_api_router()
        .with_state(state)
        // JWT 추출기가 읽는 인증 컨텍스트
        .layer(Extension(auth_ctx))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 저장소 호출이 매달리지 않도록 요청 단위로 묶는다
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleur_api=info,tower_http=debug".into()),
        )
        .init();

    info!("Starting FleurMarket API server...");

    // 설정 로드. JWT 서명 설정이 비어 있으면 여기서 기동이 실패한다.
    // 부분적으로 뜬 서비스보다 명확한 배포 오류가 낫다.
    let config = AppConfig::from_env()?;
    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // DB 풀은 lazy로 만든다. 저장소가 일시적으로 죽어 있어도 서비스는
    // 떠야 하고, 보호된 라우트는 복구될 때까지 호출자를 거부하면 된다.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(&config.database_url)?;

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let auth = Arc::new(config.auth.clone());

    // 역할/슈퍼 관리자 시드. 리스너가 뜨기 전에 완료(또는 실패 로그)까지
    // 기다리므로 요청 처리와 경합하지 않는다. 실패해도 기동은 계속한다.
    match seed::ensure_bootstrapped(store.as_ref(), &config.seed).await {
        Ok(()) => info!("시드 완료"),
        Err(e) => error!(error = %e, "시드 실패. 서비스는 계속 기동합니다"),
    }

    let state = Arc::new(AppState::new(store, auth.clone()).with_db_pool(pool));
    let app = create_router(state, AuthContext(auth));

    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료를 시작합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
