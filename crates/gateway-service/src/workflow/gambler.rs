//! 玩家只读查询
//!
//! 列表类查询把资源服务的响应体原样透传，网关只负责改写查询条件。

use ditebak_resource::models::User;
use ditebak_shared::error::{AppError, Result};
use serde::Deserialize;
use tracing::instrument;

use crate::client::ResourceClient;

/// 玩家可见的题目状态
const VISIBLE_TOPIC_STATES: &str = "published,closed,answered";

/// 调用方传入的分页参数，原样转发
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageParams {
    fn append<'a>(&'a self, params: &mut Vec<(&'static str, &'a str)>) {
        if let Some(page) = &self.page {
            params.push(("page", page));
        }
        if let Some(size) = &self.size {
            params.push(("size", size));
        }
    }
}

#[derive(Clone)]
pub struct GamblerQueries {
    client: ResourceClient,
}

impl GamblerQueries {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    async fn caller(&self, email: &str) -> Result<Option<User>> {
        self.client.find_user_by_email(email).await
    }

    #[instrument(skip(self))]
    pub async fn my_profile(&self, email: &str) -> Result<User> {
        self.caller(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 调用者自己的下注列表
    #[instrument(skip(self, paging))]
    pub async fn my_bets(&self, email: &str, paging: &PageParams) -> Result<Vec<u8>> {
        let owner = self.owner_id(email).await?;

        let mut params = vec![("owner", owner.as_str())];
        paging.append(&mut params);
        self.client
            .forward("bets", self.client.bets_url(&params))
            .await
    }

    /// 调用者在某个题目上的下注，至多一条
    #[instrument(skip(self))]
    pub async fn topic_bet(&self, email: &str, topic: &str) -> Result<Vec<u8>> {
        let owner = self.owner_id(email).await?;

        let params = [
            ("topic", topic),
            ("owner", owner.as_str()),
            ("page", "1"),
            ("size", "1"),
        ];
        self.client
            .forward("bets", self.client.bets_url(&params))
            .await
    }

    /// 草稿状态的题目对玩家不可见
    #[instrument(skip(self, paging))]
    pub async fn topics(&self, paging: &PageParams) -> Result<Vec<u8>> {
        let mut params = vec![("state", VISIBLE_TOPIC_STATES)];
        paging.append(&mut params);
        self.client
            .forward("topics", self.client.topics_url(&params))
            .await
    }

    #[instrument(skip(self))]
    pub async fn topic(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.client.topic_url(id)?;
        self.client.forward("topics", url).await
    }

    async fn owner_id(&self, email: &str) -> Result<String> {
        self.caller(email)
            .await?
            .and_then(|user| user.id)
            .ok_or_else(|| AppError::Unauthorized("You are not authenticated".to_string()))
    }
}
