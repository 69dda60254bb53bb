//! 测试环境管理
//!
//! 两个服务需要事先启动，网关的上游地址指向同一个资源服务。

use anyhow::{Result, anyhow};
use chrono::Duration as TokenTtl;
use ditebak_gateway::JwtIdentityProvider;
use ditebak_shared::config::IdentityConfig;
use serde_json::{Value, json};
use std::time::Duration;

use super::super::helpers::ApiClient;

/// 测试环境配置
#[derive(Debug, Clone)]
pub struct TestEnvConfig {
    /// 资源服务地址
    pub resource_service_url: String,
    /// 网关服务地址
    pub gateway_service_url: String,
    /// 与网关一致的身份配置，用于签发登录用的 ID Token
    pub identity: IdentityConfig,
    /// 等待服务就绪的超时时间
    pub service_ready_timeout: Duration,
}

impl Default for TestEnvConfig {
    fn default() -> Self {
        let mut identity = IdentityConfig::default();
        if let Ok(secret) = std::env::var("DITEBAK_IDENTITY__ID_TOKEN_SECRET") {
            identity.id_token_secret = secret;
        }
        if let Ok(issuer) = std::env::var("DITEBAK_IDENTITY__ISSUER") {
            identity.issuer = issuer;
        }

        Self {
            // 使用 127.0.0.1 而非 localhost，避免 IPv6 连接问题
            resource_service_url: std::env::var("RESOURCE_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".into()),
            gateway_service_url: std::env::var("GATEWAY_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".into()),
            identity,
            service_ready_timeout: Duration::from_secs(30),
        }
    }
}

/// 测试环境
pub struct TestEnvironment {
    pub config: TestEnvConfig,
    /// 资源服务客户端
    pub resources: ApiClient,
    /// 网关服务客户端（未登录）
    pub gateway: ApiClient,
    identity: JwtIdentityProvider,
}

impl TestEnvironment {
    pub async fn setup() -> Result<Self> {
        let config = TestEnvConfig::default();
        tracing::info!("初始化测试环境...");

        for url in [&config.resource_service_url, &config.gateway_service_url] {
            wait_ready(url, config.service_ready_timeout).await?;
        }

        Ok(Self {
            resources: ApiClient::new(&config.resource_service_url),
            gateway: ApiClient::new(&config.gateway_service_url),
            identity: JwtIdentityProvider::new(&config.identity),
            config,
        })
    }

    /// 每个测试使用独立邮箱，避免唯一键冲突
    pub fn unique_email(prefix: &str) -> String {
        format!("{}-{}@e2e.ditebak.test", prefix, uuid::Uuid::new_v4().simple())
    }

    /// 构造身份联合服务的登录结果
    pub fn login_payload(&self, email: &str, is_new_user: bool) -> Result<Value> {
        let id_token = self
            .identity
            .sign_id_token("e2e-uid", email, TokenTtl::minutes(5))
            .map_err(|e| anyhow!("签发 ID Token 失败: {}", e))?;

        Ok(json!({
            "user": {
                "uid": "e2e-uid",
                "displayName": "E2E Player",
                "email": email,
                "emailVerified": true,
                "stsTokenManager": {
                    "accessToken": id_token,
                    "refreshToken": "e2e-refresh",
                    "expirationTime": 0
                }
            },
            "credential": {"providerId": "google.com"},
            "additionalUserInfo": {"providerId": "google.com", "isNewUser": is_new_user}
        }))
    }

    /// 登录并返回携带会话的网关客户端
    pub async fn login_as(&self, email: &str) -> Result<ApiClient> {
        let reply = self.gateway.login(self.login_payload(email, true)?).await?;
        let cookie = reply
            .set_cookie
            .ok_or_else(|| anyhow!("登录未下发会话 Cookie: {} {}", reply.status, reply.body))?;
        Ok(self.gateway.with_session(&cookie))
    }
}

async fn wait_ready(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let healthy = client
            .get(format!("{}/health", base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false);
        if healthy {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(anyhow!("服务未就绪: {}", base_url));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
