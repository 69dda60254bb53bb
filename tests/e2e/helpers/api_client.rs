//! REST API 客户端
//!
//! 封装对资源服务与网关服务的 HTTP 调用，所有请求体都包在 `{"data": ...}` 中。

use anyhow::{Result, anyhow};
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;

/// 带状态码的原始响应
#[derive(Debug)]
pub struct RawReply {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// API 客户端
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    /// 登录后携带的会话 Cookie（`fa-session=...`）
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("创建 HTTP 客户端失败");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    /// 使用指定会话的副本
    pub fn with_session(&self, cookie: &str) -> Self {
        let session = cookie.split(';').next().map(str::to_string);
        Self {
            session,
            ..self.clone()
        }
    }

    // ========== 通用请求 ==========

    /// 发送请求并返回状态码与 JSON 响应体，不因错误状态码失败
    pub async fn send(&self, method: Method, path: &str, data: Option<Value>) -> Result<RawReply> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(session) = &self.session {
            request = request.header(header::COOKIE, session);
        }
        if let Some(data) = data {
            request = request.json(&json!({ "data": data }));
        }

        let response = request.send().await?;
        Self::raw(response).await
    }

    async fn raw(response: Response) -> Result<RawReply> {
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(RawReply {
            status,
            set_cookie,
            body,
        })
    }

    /// 成功时解析 `data` 字段
    pub async fn data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&impl Serialize>,
    ) -> Result<T> {
        let payload = payload.map(serde_json::to_value).transpose()?;
        let reply = self.send(method.clone(), path, payload).await?;
        if !reply.status.is_success() {
            return Err(anyhow!(
                "{} {} 失败: {} {}",
                method,
                path,
                reply.status,
                reply.body
            ));
        }
        Ok(serde_json::from_value(reply.body["data"].clone())?)
    }

    // ========== 资源服务 ==========

    pub async fn create<T: DeserializeOwned>(
        &self,
        resource: &str,
        payload: &impl Serialize,
    ) -> Result<T> {
        self.data(Method::POST, &format!("/{}", resource), Some(payload))
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
        payload: &impl Serialize,
    ) -> Result<T> {
        self.data(Method::PATCH, &format!("/{}/{}", resource, id), Some(payload))
            .await
    }

    pub async fn get(&self, resource: &str, id: &str) -> Result<RawReply> {
        self.send(Method::GET, &format!("/{}/{}", resource, id), None)
            .await
    }

    /// 分页查询，`query` 形如 `state=published&page=1`
    pub async fn list(&self, resource: &str, query: &str) -> Result<RawReply> {
        self.send(Method::GET, &format!("/{}?{}", resource, query), None)
            .await
    }

    pub async fn delete(&self, resource: &str, id: &str) -> Result<StatusCode> {
        let reply = self
            .send(Method::DELETE, &format!("/{}/{}", resource, id), None)
            .await?;
        Ok(reply.status)
    }

    /// 物理删除
    pub async fn remove(&self, resource: &str, id: &str) -> Result<StatusCode> {
        let method = Method::from_bytes(b"REMOVE")?;
        let reply = self
            .send(method, &format!("/{}/{}", resource, id), None)
            .await?;
        Ok(reply.status)
    }

    // ========== 网关服务 ==========

    /// 登录并返回 Set-Cookie 头
    pub async fn login(&self, payload: Value) -> Result<RawReply> {
        self.send(Method::POST, "/pgw/login", Some(payload)).await
    }

    pub async fn answer(&self, topic: &str, answer: &str) -> Result<RawReply> {
        self.send(
            Method::POST,
            "/pgw/answers",
            Some(json!({ "topic": topic, "answer": answer })),
        )
        .await
    }

    pub async fn place_bet(&self, topic: &str, prediction: &str, stake: i64) -> Result<RawReply> {
        self.send(
            Method::POST,
            "/ggw/bets",
            Some(json!({ "topic": topic, "prediction": prediction, "stake": stake })),
        )
        .await
    }

    pub async fn profile(&self) -> Result<RawReply> {
        self.send(Method::GET, "/ggw/profile", None).await
    }

    pub async fn my_bets(&self) -> Result<RawReply> {
        self.send(Method::GET, "/ggw/bets", None).await
    }
}
