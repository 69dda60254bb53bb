//! HTTP 处理器
//!
//! - `platform`: `/pgw/*`，登录、退出与公布答案
//! - `gambler`: `/ggw/*`，玩家的资料、题目与下注

pub mod gambler;
pub mod platform;

use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

/// 原样返回资源服务的 JSON 响应体
fn passthrough(body: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}
