//! 会话守卫
//!
//! 从 `fa-session` Cookie 中取出会话令牌，交给身份提供方校验，
//! 把调用者身份作为 `SessionContext` 注入请求扩展。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use ditebak_shared::error::{AppError, Result};
use time::Duration;
use tracing::debug;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "fa-session";

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub subject: String,
    pub email: String,
}

/// 会话守卫中间件
pub async fn session_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let session = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("You are not authenticated".to_string()))?;

    let claims = state
        .identity
        .verify_session(&session)
        .await
        .map_err(|e| {
            debug!(error = %e, "会话校验失败");
            AppError::Unauthorized("You are not authenticated".to_string())
        })?;

    request.extensions_mut().insert(SessionContext {
        subject: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// 会话 Cookie 的属性
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub max_age_secs: i64,
    /// 生产环境下写入 Domain 与 Secure
    pub domain: Option<String>,
}

impl CookieSettings {
    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .max_age(max_age)
            .http_only(true);
        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone()).secure(true);
        }
        cookie.build()
    }

    /// 登录成功后下发的 Cookie
    pub fn issue(&self, jar: CookieJar, session: &str) -> CookieJar {
        jar.add(self.build(session.to_string(), Duration::seconds(self.max_age_secs)))
    }

    /// 退出登录时清除 Cookie
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), Duration::ZERO))
    }
}
