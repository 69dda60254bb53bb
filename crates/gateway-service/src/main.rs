//! 网关服务入口

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, http::HeaderValue, middleware, routing::get};
use ditebak_gateway::{
    AppState, GatewayClient, JwtIdentityProvider, ResourceClient, UpstreamUrls, routes,
};
use ditebak_shared::{
    config::AppConfig,
    observability::{self, middleware as obs_middleware},
    retry::RetryPolicy,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "ditebak-gateway-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();

    let obs_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let gateway = GatewayClient::new(
        Duration::from_secs(config.upstream.timeout_seconds),
        RetryPolicy::with_max_retries(config.upstream.retry_count),
    )?;
    let client = ResourceClient::new(gateway, UpstreamUrls::from_config(&config.upstream)?);

    if config.identity.session_secret.is_empty() || config.identity.id_token_secret.is_empty() {
        warn!("Identity secrets are empty, sessions are not protected");
    }
    let identity = Arc::new(JwtIdentityProvider::new(&config.identity));

    let state = AppState::new(client, identity, &config.gateway, config.is_production());

    // 会话走 Cookie，CORS 必须列出具体来源并允许携带凭证
    let allowed_origins = std::env::var("DITEBAK_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = Router::new()
        .merge(routes::api_routes(state))
        .route("/health", get(health_check))
        .route("/ready", get(health_check))
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
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
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}
