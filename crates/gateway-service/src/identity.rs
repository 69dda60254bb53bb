//! 身份提供方
//!
//! 网关只依赖 `IdentityProvider` 这一能力：校验登录时提交的 ID Token、
//! 签发会话令牌、校验会话 Cookie。自带实现基于 HS256 JWT。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ditebak_shared::config::IdentityConfig;
use ditebak_shared::error::{AppError, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// 令牌载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// 身份联合服务中的用户标识
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// 身份提供方能力
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 校验登录时提交的 ID Token
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims>;

    /// 基于已校验的 ID Token 签发会话令牌
    async fn create_session(&self, id_token: &str, duration: Duration) -> Result<String>;

    /// 校验会话令牌
    async fn verify_session(&self, session: &str) -> Result<IdentityClaims>;
}

/// HS256 JWT 身份提供方
#[derive(Clone)]
pub struct JwtIdentityProvider {
    issuer: String,
    id_token_encoding: EncodingKey,
    id_token_decoding: DecodingKey,
    session_encoding: EncodingKey,
    session_decoding: DecodingKey,
}

impl JwtIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            id_token_encoding: EncodingKey::from_secret(config.id_token_secret.as_bytes()),
            id_token_decoding: DecodingKey::from_secret(config.id_token_secret.as_bytes()),
            session_encoding: EncodingKey::from_secret(config.session_secret.as_bytes()),
            session_decoding: DecodingKey::from_secret(config.session_secret.as_bytes()),
        }
    }

    fn claims(&self, sub: &str, email: &str, ttl: Duration) -> IdentityClaims {
        let now = Utc::now();
        IdentityClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        }
    }

    /// 签发 ID Token，供本地开发和测试模拟身份联合服务
    pub fn sign_id_token(&self, sub: &str, email: &str, ttl: Duration) -> Result<String> {
        encode(
            &Header::default(),
            &self.claims(sub, email, ttl),
            &self.id_token_encoding,
        )
        .map_err(|e| AppError::Internal(format!("ID Token 签发失败: {}", e)))
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<IdentityClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<IdentityClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims> {
        self.verify(id_token, &self.id_token_decoding)
    }

    async fn create_session(&self, id_token: &str, duration: Duration) -> Result<String> {
        let identity = self.verify(id_token, &self.id_token_decoding)?;
        let claims = self.claims(&identity.sub, &identity.email, duration);

        encode(&Header::default(), &claims, &self.session_encoding)
            .map_err(|e| AppError::Internal(format!("会话令牌签发失败: {}", e)))
    }

    async fn verify_session(&self, session: &str) -> Result<IdentityClaims> {
        self.verify(session, &self.session_decoding)
    }
}
