//! 上游调用封装
//!
//! 网关把资源服务的 REST 接口当作数据层使用。每次调用由一个 `RequestDescriptor` 描述：
//! 方法、地址、可选载荷、响应分类器和响应解析器。执行流程固定为
//! 发送（传输层失败自动重试）-> 按状态码分类 -> 按 `{"data": ...}` 约定解析。
//! 任何一步失败都直接返回错误，不会产生部分结果。

mod resources;

use std::time::Duration;

use ditebak_shared::error::{AppError, Result};
use ditebak_shared::observability::metrics;
use ditebak_shared::response::DataEnvelope;
use ditebak_shared::retry::{RetryPolicy, retry_with_policy};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub use resources::{ResourceClient, UpstreamUrls};

/// 响应分类器：把状态码映射为成功或错误
pub type Classifier = fn(StatusCode, &Method, &str) -> Result<()>;

type Parser<T> = Box<dyn FnOnce(&[u8]) -> std::result::Result<T, serde_json::Error> + Send>;

/// 默认分类器
///
/// 408 -> GatewayTimeout，400 -> Validation，404 -> NotFound，
/// 其余 >= 400 的状态码原样透传
pub fn default_classifier(status: StatusCode, method: &Method, url: &str) -> Result<()> {
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(());
    }

    Err(match status {
        StatusCode::REQUEST_TIMEOUT => {
            AppError::GatewayTimeout(format!("Request timed out to [{}] url: {}", method, url))
        }
        StatusCode::BAD_REQUEST => {
            AppError::Validation(format!("Invalid request to [{}] url: {}", method, url))
        }
        StatusCode::NOT_FOUND => {
            AppError::NotFound(format!("Resource with [{}] url: {}, is not found", method, url))
        }
        other => AppError::Upstream {
            status: other.as_u16(),
            message: format!("Failed to [{}] to url: {}", method, url),
        },
    })
}

/// 一次上游调用的完整描述
pub struct RequestDescriptor<T> {
    pub method: Method,
    /// 资源名，用于日志和指标标签
    pub resource: &'static str,
    pub url: String,
    pub payload: Option<Vec<u8>>,
    pub classify: Classifier,
    parse: Parser<T>,
}

impl<T: Send + 'static> RequestDescriptor<T> {
    fn with_parser(method: Method, resource: &'static str, url: String, parse: Parser<T>) -> Self {
        Self {
            method,
            resource,
            url,
            payload: None,
            classify: default_classifier,
            parse,
        }
    }

    /// 把载荷包装成 `{"data": payload}` 作为请求体
    pub fn with_payload<P: Serialize>(mut self, payload: &P) -> Result<Self> {
        let body = serde_json::to_vec(&DataEnvelope::new(payload))
            .map_err(|e| AppError::Internal(format!("请求载荷序列化失败: {}", e)))?;
        self.payload = Some(body);
        Ok(self)
    }

    pub fn with_classifier(mut self, classify: Classifier) -> Self {
        self.classify = classify;
        self
    }
}

impl<T: DeserializeOwned + Send + 'static> RequestDescriptor<T> {
    /// 响应体按 `{"data": T}` 解析
    pub fn unwrap_data(method: Method, resource: &'static str, url: impl Into<String>) -> Self {
        Self::with_parser(
            method,
            resource,
            url.into(),
            Box::new(|body| serde_json::from_slice::<DataEnvelope<T>>(body).map(|e| e.data)),
        )
    }
}

impl RequestDescriptor<()> {
    /// 忽略响应体
    pub fn discard(method: Method, resource: &'static str, url: impl Into<String>) -> Self {
        Self::with_parser(method, resource, url.into(), Box::new(|_| Ok(())))
    }
}

impl RequestDescriptor<Vec<u8>> {
    /// 原样返回响应体，用于透传
    pub fn raw(method: Method, resource: &'static str, url: impl Into<String>) -> Self {
        Self::with_parser(method, resource, url.into(), Box::new(|body| Ok(body.to_vec())))
    }
}

/// 上游 HTTP 客户端
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    retry: RetryPolicy,
}

/// 传输层失败（连接拒绝、超时、读取响应体失败）
fn transport_error(method: &Method, url: &str, err: reqwest::Error) -> AppError {
    AppError::BadGateway {
        message: format!("Failed to [{}] to url: {}", method, url),
        detail: err.to_string(),
    }
}

impl GatewayClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self { http, retry })
    }

    /// 执行一次调用
    ///
    /// 只有传输层失败会重试；已经拿到响应的错误状态码与解析失败不重试。
    /// POST 不幂等，超时时上游可能已经创建成功，因此只发送一次
    pub async fn execute<T>(&self, request: RequestDescriptor<T>) -> Result<T> {
        let RequestDescriptor {
            method,
            resource,
            url,
            payload,
            classify,
            parse,
        } = request;

        let operation = format!("{} {}", method, resource);
        let policy = if method == Method::POST {
            self.retry.once()
        } else {
            self.retry.clone()
        };
        let sent = retry_with_policy(&policy, &operation, AppError::is_retryable, || {
            let mut builder = self.http.request(method.clone(), &url);
            if let Some(body) = &payload {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let method = &method;
            let url = &url;
            async move {
                let response = builder
                    .send()
                    .await
                    .map_err(|e| transport_error(method, url, e))?;
                let status = response.status();
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| transport_error(method, url, e))?;
                Ok((status, body))
            }
        })
        .await;

        let (status, body) = match sent {
            Ok(sent) => sent,
            Err(err) => {
                metrics::record_upstream_request(resource, method.as_str(), "error");
                return Err(err);
            }
        };

        metrics::record_upstream_request(resource, method.as_str(), status.as_str());
        debug!(method = %method, url = %url, status = status.as_u16(), "上游调用完成");

        classify(status, &method, &url)?;

        parse(&body).map_err(|e| AppError::BadGateway {
            message: format!("Failed to parse response from url: {}", url),
            detail: e.to_string(),
        })
    }
}
