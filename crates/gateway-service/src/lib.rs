//! 网关服务
//!
//! 把资源服务当作数据层，对外提供平台网关（`/pgw/*`）与玩家网关（`/ggw/*`）：
//! 登录、结算、下注以及玩家的只读查询。

pub mod client;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use client::{GatewayClient, ResourceClient, UpstreamUrls};
pub use identity::{IdentityProvider, JwtIdentityProvider};
pub use state::AppState;
