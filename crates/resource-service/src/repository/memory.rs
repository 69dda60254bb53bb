//! 内存文档存储
//!
//! 使用 DashMap 按集合分片保存文档，语义与 PostgreSQL 实现一致：
//! 唯一键约束、浅合并更新、upsert、按 JSON 值排序（同值按插入顺序）。
//! 用于本地开发（`storage.backend = "memory"`）和测试。

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use super::options::{CollectionSpec, FindQuery, UpdateOutcome};
use super::traits::DocumentStore;
use crate::error::{Result, StoreError};

/// 单个文档及其插入序号
#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    fields: Map<String, Value>,
}

#[derive(Debug, Default)]
struct MemoryCollection {
    next_seq: u64,
    documents: HashMap<String, StoredDocument>,
}

impl MemoryCollection {
    fn insert(&mut self, id: String, fields: Map<String, Value>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.documents.insert(id, StoredDocument { seq, fields });
    }

    /// 检查 `fields` 在唯一键上是否与除 `own_id` 之外的文档冲突
    fn check_unique(
        &self,
        spec: &CollectionSpec,
        own_id: Option<&str>,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        for key in spec.unique_fields {
            let Some(value) = fields.get(*key).filter(|v| !v.is_null()) else {
                continue;
            };

            let clash = self
                .documents
                .iter()
                .any(|(id, doc)| Some(id.as_str()) != own_id && doc.fields.get(*key) == Some(value));

            if clash {
                return Err(StoreError::duplicate(
                    spec.name,
                    format!("{} already exists: {}", key, value),
                ));
            }
        }
        Ok(())
    }
}

/// 内存文档存储
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<&'static str, MemoryCollection>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_id(id: &str, fields: &Map<String, Value>) -> Value {
    let mut fields = fields.clone();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(fields)
}

fn into_fields(document: Value) -> Map<String, Value> {
    match document {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// 与 jsonb 排序近似：缺失字段最小，数字按数值，字符串按字典序
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ensure_collection(&self, collection: &CollectionSpec) -> Result<()> {
        self.collections.entry(collection.name).or_default();
        Ok(())
    }

    async fn get(&self, collection: &CollectionSpec, id: &str) -> Result<Option<Value>> {
        Ok(self.collections.get(collection.name).and_then(|coll| {
            coll.documents
                .get(id)
                .map(|doc| with_id(id, &doc.fields))
        }))
    }

    async fn find(
        &self,
        collection: &CollectionSpec,
        query: &FindQuery,
    ) -> Result<(u64, Vec<Value>)> {
        let Some(coll) = self.collections.get(collection.name) else {
            return Ok((0, Vec::new()));
        };

        let mut matched: Vec<(u64, Value)> = coll
            .documents
            .iter()
            .map(|(id, doc)| (doc.seq, with_id(id, &doc.fields)))
            .filter(|(_, doc)| query.filters.iter().all(|f| f.matches(doc)))
            .collect();
        drop(coll);

        let field = query.sort.field.as_str();
        matched.sort_by(|(seq_a, a), (seq_b, b)| {
            let by_field = compare_values(a.get(field), b.get(field));
            let by_field = if query.sort.descending {
                by_field.reverse()
            } else {
                by_field
            };
            by_field.then(seq_a.cmp(seq_b))
        });

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .map(|(_, doc)| doc)
            .collect();

        Ok((total, page))
    }

    async fn insert(&self, collection: &CollectionSpec, document: Value) -> Result<String> {
        let fields = into_fields(document);
        let mut coll = self.collections.entry(collection.name).or_default();
        coll.check_unique(collection, None, &fields)?;

        let id = uuid::Uuid::new_v4().to_string();
        coll.insert(id.clone(), fields);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &CollectionSpec,
        id: &str,
        changes: Value,
        upsert: bool,
    ) -> Result<Option<UpdateOutcome>> {
        let changes = into_fields(changes);
        let mut coll = self.collections.entry(collection.name).or_default();

        let existing = coll.documents.get(id).map(|doc| doc.fields.clone());
        match existing {
            Some(mut merged) => {
                merged.extend(changes);
                coll.check_unique(collection, Some(id), &merged)?;

                let document = with_id(id, &merged);
                if let Some(doc) = coll.documents.get_mut(id) {
                    doc.fields = merged;
                }
                Ok(Some(UpdateOutcome {
                    document,
                    upserted_id: None,
                }))
            }
            None if upsert => {
                coll.check_unique(collection, None, &changes)?;

                let document = with_id(id, &changes);
                coll.insert(id.to_string(), changes);
                Ok(Some(UpdateOutcome {
                    document,
                    upserted_id: Some(id.to_string()),
                }))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, collection: &CollectionSpec, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(collection.name)
            .map(|mut coll| coll.documents.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
