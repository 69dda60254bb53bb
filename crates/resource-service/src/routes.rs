//! 路由配置模块

use axum::{
    Router,
    routing::{any, get},
};

use crate::{handlers, resources::Resource, service::ResourceService, state::AppState};

/// 单个资源的 CRUD 路由
pub fn resource_routes<E: Resource>(service: ResourceService<E>) -> Router {
    Router::new()
        .route("/", get(handlers::find::<E>).post(handlers::create::<E>))
        .route("/{id}", any(handlers::dispatch::<E>))
        .with_state(service)
}

/// 构建全部资源路由
pub fn api_routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", resource_routes(state.users.clone()))
        .nest("/topics", resource_routes(state.topics.clone()))
        .nest("/bets", resource_routes(state.bets.clone()))
        .nest("/credentials", resource_routes(state.credentials.clone()))
}
