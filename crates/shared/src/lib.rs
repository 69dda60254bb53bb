//! 共享库
//!
//! 包含资源服务与网关服务共用的配置、错误处理、响应信封、重试、数据库连接和可观测性等基础设施代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
pub mod response;
pub mod retry;
