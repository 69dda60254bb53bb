//! 持久化层 Trait 定义
//!
//! `DocumentStore` 是引擎与存储后端之间的接缝，`LifecycleHooks` 让每种实体在写入前后
//! 注入自己的行为（时间戳、初始状态、id 回写），`Entity` 把实体类型与其集合描述绑定。

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::options::{CollectionSpec, FindQuery, UpdateOptions, UpdateOutcome};
use crate::error::Result;

/// 可持久化的实体
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// 部分更新载荷，未设置的字段不会被写入
    type Patch: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    const COLLECTION: CollectionSpec;
}

/// 实体生命周期钩子
///
/// 钩子在引擎中按固定顺序调用：
/// - create: `on_will_create` -> 写入 -> `on_did_create(id)`
/// - update: `on_will_update` -> 合并写入 -> `on_did_update(upserted_id)`
pub trait LifecycleHooks<E: Entity>: Send + Sync {
    fn on_will_create(&self, _entity: &mut E) {}

    /// 写入成功后回填存储分配的 id
    fn on_did_create(&self, entity: &mut E, id: &str);

    fn on_will_update(&self, _patch: &mut E::Patch, _options: &mut UpdateOptions) {}

    /// 仅当本次更新实际新建了记录时 `upserted_id` 才有值
    fn on_did_update(&self, _patch: &mut E::Patch, _upserted_id: Option<&str>) {}
}

/// 文档存储后端
///
/// 以 JSON 文档为单位读写；返回的文档都带有 `id` 字段。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 准备集合（建表、唯一索引），可重复调用
    async fn ensure_collection(&self, collection: &CollectionSpec) -> Result<()>;

    async fn get(&self, collection: &CollectionSpec, id: &str) -> Result<Option<Value>>;

    /// 返回 (满足条件的总数, 当前页文档)
    async fn find(&self, collection: &CollectionSpec, query: &FindQuery)
    -> Result<(u64, Vec<Value>)>;

    /// 插入新文档并返回分配的 id，违反唯一键时返回 `StoreError::Duplicate`
    async fn insert(&self, collection: &CollectionSpec, document: Value) -> Result<String>;

    /// 按 id 浅合并字段；目标不存在且不允许 upsert 时返回 None
    async fn update(
        &self,
        collection: &CollectionSpec,
        id: &str,
        changes: Value,
        upsert: bool,
    ) -> Result<Option<UpdateOutcome>>;

    /// 物理删除，返回是否删除了记录
    async fn remove(&self, collection: &CollectionSpec, id: &str) -> Result<bool>;

    async fn health_check(&self) -> Result<()>;
}
