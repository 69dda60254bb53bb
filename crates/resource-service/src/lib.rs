//! 资源服务
//!
//! 为 users、topics、bets、credentials 四种资源提供统一的 CRUD REST 接口：
//! - `query`: 查询参数到过滤谓词的翻译
//! - `repository`: 通用持久化引擎与文档存储
//! - `resources`: 各资源的生命周期钩子与可过滤字段
//! - `service` / `handlers`: 错误映射与 HTTP 控制器

pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod resources;
pub mod routes;
pub mod service;
pub mod state;

pub use error::StoreError;
pub use models::*;
pub use repository::{DocumentStore, MemoryDocumentStore, PgDocumentStore, Repository};
pub use service::ResourceService;
pub use state::AppState;
