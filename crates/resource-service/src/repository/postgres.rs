//! PostgreSQL 文档存储
//!
//! 每个集合一张表：`id UUID` 主键 + `doc JSONB` 文档体。
//! 部分更新使用 `doc || $changes` 浅合并，upsert 使用 `INSERT .. ON CONFLICT (id)`，
//! 唯一键通过 `(doc ->> 'field')` 表达式唯一索引实现。

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use super::options::{CollectionSpec, FindQuery, UpdateOutcome};
use super::traits::DocumentStore;
use crate::error::{Result, StoreError};
use crate::query::{Filter, Predicate, as_text};

/// 读取时把行 id 注入文档
const DOC_WITH_ID: &str = "doc || jsonb_build_object('id', id::text) AS doc";

#[derive(sqlx::FromRow)]
struct DocumentRow {
    doc: Json<Value>,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    id: String,
    inserted: bool,
    doc: Json<Value>,
}

/// PostgreSQL 文档存储
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 唯一索引冲突映射为 Duplicate，其余保持数据库错误
fn map_write_error(collection: &CollectionSpec, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::duplicate(collection.name, db_err.message());
        }
    }
    StoreError::Database(err)
}

fn single_field(field: &str, value: &Value) -> Json<Value> {
    let mut map = serde_json::Map::new();
    map.insert(field.to_string(), value.clone());
    Json(Value::Object(map))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for filter in filters {
        match &filter.predicate {
            Predicate::Eq(value) => {
                builder
                    .push(" AND doc @> ")
                    .push_bind(single_field(&filter.field, value));
            }
            Predicate::NotEq(value) => {
                builder
                    .push(" AND NOT (doc @> ")
                    .push_bind(single_field(&filter.field, value))
                    .push(")");
            }
            Predicate::AnyOf(values) => {
                let candidates: Vec<String> = values.iter().map(as_text).collect();
                builder
                    .push(" AND doc ->> ")
                    .push_bind(filter.field.clone())
                    .push(" = ANY(")
                    .push_bind(candidates)
                    .push(")");
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn ensure_collection(&self, collection: &CollectionSpec) -> Result<()> {
        let table = collection.name;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                doc JSONB NOT NULL DEFAULT '{{}}'::jsonb
            )
            "#
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        for field in collection.unique_fields {
            let ddl = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{field}_key ON {table} ((doc ->> '{field}'))"
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }

        info!(table, "集合已就绪");
        Ok(())
    }

    async fn get(&self, collection: &CollectionSpec, id: &str) -> Result<Option<Value>> {
        // 非 UUID 的 id 不可能存在
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let sql = format!("SELECT {DOC_WITH_ID} FROM {} WHERE id = $1", collection.name);
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.doc.0))
    }

    async fn find(
        &self,
        collection: &CollectionSpec,
        query: &FindQuery,
    ) -> Result<(u64, Vec<Value>)> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} WHERE TRUE",
            collection.name
        ));
        push_filters(&mut count, &query.filters);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {DOC_WITH_ID} FROM {} WHERE TRUE",
            collection.name
        ));
        push_filters(&mut select, &query.filters);
        select
            .push(" ORDER BY doc -> ")
            .push_bind(query.sort.field.clone())
            .push(if query.sort.descending {
                " DESC NULLS LAST"
            } else {
                " ASC NULLS FIRST"
            })
            .push(", id ASC LIMIT ")
            .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));

        let rows = select
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((
            total.max(0) as u64,
            rows.into_iter().map(|r| r.doc.0).collect(),
        ))
    }

    async fn insert(&self, collection: &CollectionSpec, document: Value) -> Result<String> {
        let sql = format!(
            "INSERT INTO {} (doc) VALUES ($1) RETURNING id::text",
            collection.name
        );

        sqlx::query_scalar::<_, String>(&sql)
            .bind(Json(document))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(collection, e))
    }

    async fn update(
        &self,
        collection: &CollectionSpec,
        id: &str,
        changes: Value,
        upsert: bool,
    ) -> Result<Option<UpdateOutcome>> {
        let table = collection.name;
        let parsed = Uuid::parse_str(id).ok();

        if upsert {
            // 非 UUID 的 id 无法作为主键，upsert 时改用新生成的 id
            let target = parsed.unwrap_or_else(Uuid::new_v4);
            let sql = format!(
                r#"
                INSERT INTO {table} (id, doc) VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET doc = {table}.doc || EXCLUDED.doc
                RETURNING id::text AS id, (xmax = 0) AS inserted, {DOC_WITH_ID}
                "#
            );

            let row = sqlx::query_as::<_, UpsertRow>(&sql)
                .bind(target)
                .bind(Json(changes))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_write_error(collection, e))?;

            return Ok(Some(UpdateOutcome {
                document: row.doc.0,
                upserted_id: row.inserted.then_some(row.id),
            }));
        }

        let Some(target) = parsed else {
            return Ok(None);
        };
        let sql = format!("UPDATE {table} SET doc = doc || $2 WHERE id = $1 RETURNING {DOC_WITH_ID}");

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(target)
            .bind(Json(changes))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(collection, e))?;

        Ok(row.map(|r| UpdateOutcome {
            document: r.doc.0,
            upserted_id: None,
        }))
    }

    async fn remove(&self, collection: &CollectionSpec, id: &str) -> Result<bool> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };

        let sql = format!("DELETE FROM {} WHERE id = $1", collection.name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
