//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{handlers, middleware::session_guard, state::AppState};

/// 平台网关路由
fn platform_routes() -> Router<AppState> {
    Router::new()
        .route("/pgw/login", post(handlers::platform::login))
        .route("/pgw/logout", get(handlers::platform::logout))
        .route("/pgw/answers", post(handlers::platform::answers))
}

/// 玩家网关路由，部分需要会话
fn gambler_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/ggw/profile", get(handlers::gambler::profile))
        .route(
            "/ggw/bets",
            get(handlers::gambler::my_bets).post(handlers::gambler::place_bet),
        )
        .route("/ggw/topics/{id}/bet", get(handlers::gambler::topic_bet))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_guard));

    Router::new()
        .route("/ggw/topics", get(handlers::gambler::topics))
        .route("/ggw/topics/{id}", get(handlers::gambler::topic))
        .merge(guarded)
}

/// 构建全部网关路由
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(platform_routes())
        .merge(gambler_routes(&state))
        .with_state(state)
}
