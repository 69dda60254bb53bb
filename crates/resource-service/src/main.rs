//! 资源服务入口
//!
//! 启动 users/topics/bets/credentials 四种资源的 CRUD 服务。

use std::sync::Arc;

use axum::{Json, Router, middleware, routing::get};
use ditebak_resource::{
    AppState, DocumentStore, MemoryDocumentStore, PgDocumentStore, resources::COLLECTIONS, routes,
};
use ditebak_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "ditebak-resource-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();

    let obs_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    // 按配置选择存储后端
    let (store, db): (Arc<dyn DocumentStore>, Option<Database>) = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            (Arc::new(PgDocumentStore::new(db.pool().clone())), Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data will be lost on restart");
            (Arc::new(MemoryDocumentStore::new()), None)
        }
    };

    for collection in &COLLECTIONS {
        store.ensure_collection(collection).await?;
    }

    let state = AppState::new(store);

    let app = Router::new()
        .merge(routes::api_routes(&state))
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let store = state.store.clone();
                move || readiness_check(store.clone())
            }),
        )
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
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

/// 就绪探针：检查文档存储是否可用
async fn readiness_check(store: Arc<dyn DocumentStore>) -> Json<serde_json::Value> {
    let store_ok = store.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "storage": if store_ok { "ok" } else { "fail" }
        }
    }))
}
