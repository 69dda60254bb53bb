//! 资源服务层
//!
//! 包装持久化引擎，把存储层的结果翻译为统一的业务错误：
//! 唯一键冲突 -> Conflict，记录不存在 -> NotFound。

use ditebak_shared::error::{AppError, Result};
use tracing::warn;

use crate::error::StoreError;
use crate::repository::{FindOptions, Repository};
use crate::resources::Resource;

/// 通用资源服务
pub struct ResourceService<E: Resource> {
    repository: Repository<E>,
}

impl<E: Resource> Clone for ResourceService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

/// 存储错误 -> 业务错误
fn map_store_error(err: StoreError) -> AppError {
    match err {
        StoreError::Duplicate { collection, detail } => {
            warn!(collection = %collection, detail = %detail, "唯一键冲突");
            AppError::Conflict("Duplicate resource already exists".to_string())
        }
        StoreError::NotFound { id, .. } => {
            AppError::NotFound(format!("Resource with ID: {}, is not found", id))
        }
        StoreError::Database(e) => AppError::Database(e),
        StoreError::Serialization(e) => AppError::Internal(format!("文档序列化失败: {}", e)),
    }
}

impl<E: Resource> ResourceService<E> {
    pub fn new(repository: Repository<E>) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: &str) -> Result<E> {
        self.repository.get(id).await.map_err(map_store_error)
    }

    pub async fn find(&self, options: FindOptions) -> Result<(u64, Vec<E>)> {
        self.repository.find(options).await.map_err(map_store_error)
    }

    /// 创建并返回带 id 的实体
    pub async fn create(&self, mut entity: E) -> Result<E> {
        self.repository
            .create(&mut entity)
            .await
            .map_err(map_store_error)?;
        Ok(entity)
    }

    pub async fn update(&self, id: &str, mut patch: E::Patch) -> Result<E> {
        self.repository
            .update(id, &mut patch)
            .await
            .map_err(map_store_error)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repository.delete(id).await.map_err(map_store_error)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.repository.remove(id).await.map_err(map_store_error)
    }
}
