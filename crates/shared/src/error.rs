//! 统一错误处理模块
//!
//! 定义资源服务与网关共享的错误分类，并负责把错误映射为 HTTP 状态码和 `{message, errors}` 响应体。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::ErrorBody;

/// 系统错误类型
///
/// 每个变体都携带面向用户的消息；底层细节（解析错误、传输错误）单独保存在 `detail` 中，
/// 由 `errors` 字段返回给调用方。
#[derive(Debug, Error)]
pub enum AppError {
    // ==================== 客户端错误 ====================
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    InvalidPayload { message: String, detail: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // ==================== 上游错误 ====================
    #[error("{message}")]
    BadGateway { message: String, detail: String },

    #[error("{0}")]
    GatewayTimeout(String),

    /// 未被单独映射的上游非 2xx 响应，状态码原样透传
    #[error("{message}")]
    Upstream { status: u16, message: String },

    // ==================== 系统错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadGateway { .. } => "BAD_GATEWAY",
            Self::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 附带的底层错误细节
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidPayload { detail, .. } | Self::BadGateway { detail, .. } => {
                Some(detail.as_str())
            }
            _ => None,
        }
    }

    /// 传输层失败，网关据此决定是否重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BadGateway { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 数据库错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "Internal server error".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "内部错误");
                msg.clone()
            }
            other if status.is_server_error() => {
                tracing::warn!(
                    code = other.error_code(),
                    error = %other,
                    detail = ?other.detail(),
                    "上游调用失败"
                );
                other.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            message,
            errors: self.detail().map(str::to_string),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_code_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::InvalidPayload {
                    message: "x".into(),
                    detail: "eof".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::BadGateway {
                    message: "x".into(),
                    detail: "refused".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::GatewayTimeout("x".into()), StatusCode::GATEWAY_TIMEOUT),
            (
                AppError::Upstream {
                    status: 409,
                    message: "x".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                AppError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "unexpected status for {:?}", err);
        }
    }

    #[test]
    fn test_upstream_invalid_status_falls_back_to_bad_gateway() {
        let err = AppError::Upstream {
            status: 1000,
            message: "x".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_only_transport_failures_are_retryable() {
        let transport = AppError::BadGateway {
            message: "Failed to [GET] to url: http://x".into(),
            detail: "connection refused".into(),
        };
        assert!(transport.is_retryable());
        assert!(!AppError::NotFound("x".into()).is_retryable());
        assert!(!AppError::GatewayTimeout("x".into()).is_retryable());
    }

    #[tokio::test]
    async fn test_into_response_envelope() {
        let err = AppError::InvalidPayload {
            message: "Failed to parse payload".into(),
            detail: "expected value at line 1 column 1".into(),
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Failed to parse payload");
        assert_eq!(body["errors"], "expected value at line 1 column 1");
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert!(body["errors"].is_null());
    }
}
