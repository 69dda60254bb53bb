//! 通用 REST 控制器
//!
//! 每种资源挂载同一组处理器：
//! - `GET /` 分页查询，`POST /` 创建
//! - `GET|PATCH|DELETE|REMOVE /{id}` 读取、部分更新、软删除、物理删除

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use ditebak_shared::error::Result;
use ditebak_shared::response::{DataEnvelope, PagedEnvelope, Paging, parse_data_body};
use tracing::info;

use crate::repository::FindOptions;
use crate::resources::Resource;
use crate::service::ResourceService;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_SIZE: i64 = 5;

/// 物理删除使用的扩展方法
pub const REMOVE_METHOD: &str = "REMOVE";

/// 读取正整数参数，缺失、无法解析或 <= 0 时使用默认值
fn positive_param(params: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    params
        .get(key)
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// 分页查询
///
/// GET /{resource}?page=&size=&<filters>
pub async fn find<E: Resource>(
    State(service): State<ResourceService<E>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PagedEnvelope<E>>> {
    let page = positive_param(&params, "page", DEFAULT_PAGE);
    let size = positive_param(&params, "size", DEFAULT_SIZE);
    let filters = E::query_schema().translate(&params);

    let (total, data) = service
        .find(FindOptions::new(page, size).with_filters(filters))
        .await?;

    Ok(Json(PagedEnvelope {
        paging: Paging::new(total, size as u64),
        data,
    }))
}

/// 创建资源
///
/// POST /{resource}，请求体 `{"data": {...}}`
pub async fn create<E: Resource>(
    State(service): State<ResourceService<E>>,
    body: Bytes,
) -> Result<Json<DataEnvelope<E>>> {
    let entity: E = parse_data_body(&body)?;
    let created = service.create(entity).await?;

    info!(collection = E::COLLECTION.name, "资源已创建");
    Ok(Json(DataEnvelope::new(created)))
}

/// 单个资源的全部方法
///
/// `/{resource}/{id}` 按请求方法分派，未知方法返回 405
pub async fn dispatch<E: Resource>(
    State(service): State<ResourceService<E>>,
    Path(id): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    match method {
        Method::GET => {
            let entity = service.get(&id).await?;
            Ok(Json(DataEnvelope::new(entity)).into_response())
        }
        Method::PATCH => {
            let patch: E::Patch = parse_data_body(&body)?;
            let updated = service.update(&id, patch).await?;
            Ok(Json(DataEnvelope::new(updated)).into_response())
        }
        Method::DELETE => {
            service.delete(&id).await?;
            info!(collection = E::COLLECTION.name, id = %id, "资源已软删除");
            Ok(StatusCode::RESET_CONTENT.into_response())
        }
        m if m.as_str() == REMOVE_METHOD => {
            service.remove(&id).await?;
            info!(collection = E::COLLECTION.name, id = %id, "资源已物理删除");
            Ok(StatusCode::RESET_CONTENT.into_response())
        }
        _ => Ok(StatusCode::METHOD_NOT_ALLOWED.into_response()),
    }
}
