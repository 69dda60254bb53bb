//! 查询与更新选项

use serde_json::Value;

use crate::query::Filter;

/// 软删除标记字段，值为 true 的文档不会出现在常规读取中
pub const REMOVED_FIELD: &str = "_deleted";

/// 集合的静态描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// 集合（表）名
    pub name: &'static str,
    /// 唯一键字段
    pub unique_fields: &'static [&'static str],
    /// 默认排序字段
    pub sort_field: &'static str,
    pub sort_descending: bool,
}

impl CollectionSpec {
    pub fn default_sort(&self) -> SortOption {
        SortOption {
            field: self.sort_field.to_string(),
            descending: self.sort_descending,
        }
    }
}

/// 排序选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub field: String,
    pub descending: bool,
}

impl SortOption {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// 分页查询选项
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub page: i64,
    pub size: i64,
    /// 为空时使用集合的默认排序
    pub sort: Option<SortOption>,
    /// 是否包含已软删除的记录
    pub include_removed: bool,
    pub filters: Vec<Filter>,
}

impl FindOptions {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            sort: None,
            include_removed: false,
            filters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn including_removed(mut self) -> Self {
        self.include_removed = true;
        self
    }

    /// 跳过的记录数，page < 1 按第 1 页处理
    pub fn skip(&self) -> u64 {
        let page = self.page.max(1) as u64;
        page.saturating_sub(1).saturating_mul(self.limit())
    }

    pub fn limit(&self) -> u64 {
        self.size.max(0) as u64
    }
}

/// 交给存储后端执行的查询，排序和软删除条件已展开
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filters: Vec<Filter>,
    pub sort: SortOption,
    pub skip: u64,
    pub limit: u64,
}

/// 更新选项，由 `on_will_update` 钩子设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// 目标不存在时是否创建
    pub upsert: bool,
}

/// 存储后端的更新结果
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// 合并后的完整文档（含 id）
    pub document: Value,
    /// 发生 upsert 时新建记录的 id
    pub upserted_id: Option<String>,
}
