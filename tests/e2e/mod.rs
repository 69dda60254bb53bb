//! Ditebak 端到端测试
//!
//! 针对运行中的资源服务与网关服务，覆盖：
//! - 资源服务的通用 CRUD（分页、过滤、软删除、物理删除、唯一键冲突）
//! - 登录、下注、公布答案结算的完整玩法链路

pub mod helpers;
pub mod setup;
pub mod suites;

pub use setup::TestEnvironment;
