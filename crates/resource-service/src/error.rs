//! 持久化层错误类型

use thiserror::Error;

/// 文档存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("记录未找到: {collection} id={id}")]
    NotFound { collection: String, id: String },

    /// 违反唯一键约束，服务层据此返回 Conflict
    #[error("唯一键冲突: {collection} - {detail}")]
    Duplicate { collection: String, detail: String },

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("文档序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 持久化结果类型别名
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(collection: &str, detail: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.to_string(),
            detail: detail.into(),
        }
    }
}
