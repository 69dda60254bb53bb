//! 通用持久化引擎
//!
//! 为一个集合提供 get/find/create/update/delete/remove，实体特有的行为全部委托给钩子。

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::options::{FindOptions, FindQuery, REMOVED_FIELD, UpdateOptions};
use super::traits::{DocumentStore, Entity, LifecycleHooks};
use crate::error::{Result, StoreError};
use crate::query::Filter;

/// 实体仓储
pub struct Repository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    hooks: Arc<dyn LifecycleHooks<E>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hooks: self.hooks.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn DocumentStore>, hooks: Arc<dyn LifecycleHooks<E>>) -> Self {
        Self {
            store,
            hooks,
            _entity: PhantomData,
        }
    }

    fn collection(&self) -> &'static str {
        E::COLLECTION.name
    }

    /// 按 id 读取，已软删除的记录视为不存在
    pub async fn get(&self, id: &str) -> Result<E> {
        let document = self
            .store
            .get(&E::COLLECTION, id)
            .await?
            .filter(|doc| !is_removed(doc))
            .ok_or_else(|| StoreError::not_found(self.collection(), id))?;

        Ok(serde_json::from_value(document)?)
    }

    /// 分页查询，返回 (总数, 当前页实体)
    pub async fn find(&self, options: FindOptions) -> Result<(u64, Vec<E>)> {
        let skip = options.skip();
        let limit = options.limit();
        let mut filters = options.filters;
        if !options.include_removed {
            filters.push(Filter::not_eq(REMOVED_FIELD, true));
        }

        let query = FindQuery {
            filters,
            sort: options.sort.unwrap_or_else(|| E::COLLECTION.default_sort()),
            skip,
            limit,
        };

        let (total, documents) = self.store.find(&E::COLLECTION, &query).await?;
        let entities = documents
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<E>, _>>()?;

        Ok((total, entities))
    }

    /// 创建实体，成功后 `entity` 已带上存储分配的 id
    pub async fn create(&self, entity: &mut E) -> Result<()> {
        self.hooks.on_will_create(entity);

        let mut document = serde_json::to_value(&*entity)?;
        strip_reserved(&mut document);

        let id = self.store.insert(&E::COLLECTION, document).await?;
        debug!(collection = self.collection(), id = %id, "文档已创建");

        self.hooks.on_did_create(entity, &id);
        Ok(())
    }

    /// 部分更新，返回合并后的完整实体
    ///
    /// 若钩子要求 upsert 且目标不存在，新记录的 id 会通过 `on_did_update` 回写到 `patch`。
    pub async fn update(&self, id: &str, patch: &mut E::Patch) -> Result<E> {
        let mut options = UpdateOptions::default();
        self.hooks.on_will_update(patch, &mut options);

        let mut changes = serde_json::to_value(&*patch)?;
        strip_reserved(&mut changes);

        let outcome = self
            .store
            .update(&E::COLLECTION, id, changes, options.upsert)
            .await?
            .ok_or_else(|| StoreError::not_found(self.collection(), id))?;

        if let Some(upserted_id) = outcome.upserted_id.as_deref() {
            debug!(collection = self.collection(), id = %upserted_id, "更新时新建了文档");
        }
        self.hooks
            .on_did_update(patch, outcome.upserted_id.as_deref());

        Ok(serde_json::from_value(outcome.document)?)
    }

    /// 软删除，重复调用或目标不存在都视为成功
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut marker = serde_json::Map::new();
        marker.insert(REMOVED_FIELD.to_string(), Value::Bool(true));
        self.store
            .update(&E::COLLECTION, id, Value::Object(marker), false)
            .await?;
        Ok(())
    }

    /// 物理删除，不可恢复
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !self.store.remove(&E::COLLECTION, id).await? {
            debug!(collection = self.collection(), id = %id, "待删除的文档不存在");
        }
        Ok(())
    }
}

fn is_removed(document: &Value) -> bool {
    document.get(REMOVED_FIELD) == Some(&Value::Bool(true))
}

/// id 由存储分配，软删除标记只能通过 delete 写入
fn strip_reserved(document: &mut Value) {
    if let Value::Object(map) = document {
        map.remove("id");
        map.remove(REMOVED_FIELD);
    }
}
