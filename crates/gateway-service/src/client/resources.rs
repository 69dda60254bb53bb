//! 资源服务的类型化调用

use ditebak_resource::models::{
    Bet, BetPatch, Credential, CredentialPatch, Topic, TopicPatch, User, UserPatch,
};
use ditebak_shared::config::UpstreamConfig;
use ditebak_shared::error::{AppError, Result};
use reqwest::{Method, Url};

use super::{GatewayClient, RequestDescriptor};

/// 各资源集合的地址
#[derive(Debug, Clone)]
pub struct UpstreamUrls {
    pub user: Url,
    pub topic: Url,
    pub bet: Url,
    pub credential: Url,
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AppError::Internal(format!("无效的上游地址 {}: {}", raw, e)))
}

impl UpstreamUrls {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            user: parse_url(&config.user_url)?,
            topic: parse_url(&config.topic_url)?,
            bet: parse_url(&config.bet_url)?,
            credential: parse_url(&config.credential_url)?,
        })
    }

    /// 所有资源挂在同一个资源服务下
    pub fn from_base(base: &str) -> Result<Self> {
        let base = base.trim_end_matches('/');
        Ok(Self {
            user: parse_url(&format!("{base}/users"))?,
            topic: parse_url(&format!("{base}/topics"))?,
            bet: parse_url(&format!("{base}/bets"))?,
            credential: parse_url(&format!("{base}/credentials"))?,
        })
    }
}

/// `{collection}/{id}`
fn item_url(collection: &Url, id: &str) -> Result<String> {
    let mut url = collection.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Internal(format!("无法拼接上游地址: {}", collection)))?
        .pop_if_empty()
        .push(id);
    Ok(url.into())
}

/// `{collection}?k=v&...`
fn query_url(collection: &Url, params: &[(&str, &str)]) -> String {
    let mut url = collection.clone();
    url.query_pairs_mut().extend_pairs(params);
    url.into()
}

/// 按邮箱查询的第一页第一条
fn by_email(email: &str) -> [(&'static str, &str); 3] {
    [("email", email), ("page", "1"), ("size", "1")]
}

/// 资源服务客户端
#[derive(Clone)]
pub struct ResourceClient {
    gateway: GatewayClient,
    urls: UpstreamUrls,
}

impl ResourceClient {
    pub fn new(gateway: GatewayClient, urls: UpstreamUrls) -> Self {
        Self { gateway, urls }
    }

    // ==================== 题目 ====================

    pub async fn get_topic(&self, id: &str) -> Result<Topic> {
        let url = item_url(&self.urls.topic, id)?;
        self.gateway
            .execute(RequestDescriptor::unwrap_data(Method::GET, "topics", url))
            .await
    }

    pub async fn patch_topic(&self, id: &str, patch: &TopicPatch) -> Result<()> {
        let url = item_url(&self.urls.topic, id)?;
        let request = RequestDescriptor::discard(Method::PATCH, "topics", url).with_payload(patch)?;
        self.gateway.execute(request).await
    }

    pub fn topics_url(&self, params: &[(&str, &str)]) -> String {
        query_url(&self.urls.topic, params)
    }

    pub fn topic_url(&self, id: &str) -> Result<String> {
        item_url(&self.urls.topic, id)
    }

    // ==================== 下注 ====================

    pub async fn find_bets(&self, params: &[(&str, &str)]) -> Result<Vec<Bet>> {
        let url = query_url(&self.urls.bet, params);
        self.gateway
            .execute(RequestDescriptor::unwrap_data(Method::GET, "bets", url))
            .await
    }

    pub async fn create_bet(&self, bet: &Bet) -> Result<Bet> {
        let request =
            RequestDescriptor::unwrap_data(Method::POST, "bets", self.urls.bet.as_str())
                .with_payload(bet)?;
        self.gateway.execute(request).await
    }

    pub async fn patch_bet(&self, id: &str, patch: &BetPatch) -> Result<()> {
        let url = item_url(&self.urls.bet, id)?;
        let request = RequestDescriptor::discard(Method::PATCH, "bets", url).with_payload(patch)?;
        self.gateway.execute(request).await
    }

    pub fn bets_url(&self, params: &[(&str, &str)]) -> String {
        query_url(&self.urls.bet, params)
    }

    // ==================== 用户 ====================

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let url = item_url(&self.urls.user, id)?;
        self.gateway
            .execute(RequestDescriptor::unwrap_data(Method::GET, "users", url))
            .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let url = query_url(&self.urls.user, &by_email(email));
        let users: Vec<User> = self
            .gateway
            .execute(RequestDescriptor::unwrap_data(Method::GET, "users", url))
            .await?;
        Ok(users.into_iter().next())
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let request =
            RequestDescriptor::unwrap_data(Method::POST, "users", self.urls.user.as_str())
                .with_payload(user)?;
        self.gateway.execute(request).await
    }

    pub async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<()> {
        let url = item_url(&self.urls.user, id)?;
        let request = RequestDescriptor::discard(Method::PATCH, "users", url).with_payload(patch)?;
        self.gateway.execute(request).await
    }

    // ==================== 凭证 ====================

    pub async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let url = query_url(&self.urls.credential, &by_email(email));
        let credentials: Vec<Credential> = self
            .gateway
            .execute(RequestDescriptor::unwrap_data(
                Method::GET,
                "credentials",
                url,
            ))
            .await?;
        Ok(credentials.into_iter().next())
    }

    pub async fn create_credential(&self, credential: &Credential) -> Result<Credential> {
        let request = RequestDescriptor::unwrap_data(
            Method::POST,
            "credentials",
            self.urls.credential.as_str(),
        )
        .with_payload(credential)?;
        self.gateway.execute(request).await
    }

    pub async fn patch_credential(&self, id: &str, patch: &CredentialPatch) -> Result<Credential> {
        let url = item_url(&self.urls.credential, id)?;
        let request = RequestDescriptor::unwrap_data(Method::PATCH, "credentials", url)
            .with_payload(patch)?;
        self.gateway.execute(request).await
    }

    // ==================== 透传 ====================

    /// GET 任意资源地址，原样返回响应体
    pub async fn forward(&self, resource: &'static str, url: String) -> Result<Vec<u8>> {
        self.gateway
            .execute(RequestDescriptor::raw(Method::GET, resource, url))
            .await
    }
}
