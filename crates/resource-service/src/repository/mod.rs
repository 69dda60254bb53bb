//! 数据访问层
//!
//! `Repository<E>` 是与实体类型绑定的通用持久化引擎；
//! 具体存储由 `DocumentStore` 的 PostgreSQL 或内存实现提供。

mod engine;
pub mod memory;
pub mod options;
pub mod postgres;
mod traits;

pub use engine::Repository;
pub use memory::MemoryDocumentStore;
pub use options::{
    CollectionSpec, FindOptions, FindQuery, REMOVED_FIELD, SortOption, UpdateOptions,
    UpdateOutcome,
};
pub use postgres::PgDocumentStore;
pub use traits::{DocumentStore, Entity, LifecycleHooks};

#[cfg(test)]
pub use traits::MockDocumentStore;
