//! 统一响应信封
//!
//! 所有服务的请求体与响应体都包在 `{"data": ...}` 中；
//! 列表响应额外携带 `paging`，错误响应为 `{message, errors}`。

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};

/// 数据信封，请求与响应共用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub total_data: u64,
    pub total_page: u64,
}

impl Paging {
    /// 根据总数和每页条数计算总页数（向上取整）
    pub fn new(total_data: u64, size: u64) -> Self {
        let total_page = if size == 0 {
            0
        } else {
            total_data.div_ceil(size)
        };
        Self {
            total_data,
            total_page,
        }
    }
}

/// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedEnvelope<T> {
    pub paging: Paging,
    pub data: Vec<T>,
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub errors: Option<String>,
}

/// 解析 `{"data": ...}` 形式的请求体
pub fn parse_data_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice::<DataEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| AppError::InvalidPayload {
            message: "Failed to parse payload".to_string(),
            detail: e.to_string(),
        })
}
