//! 下注流程
//!
//! 校验按固定顺序进行，遇到第一个失败即返回：
//! 押注范围 -> 题目 id -> 用户存在 -> 题目已发布 -> 未过截止时间 -> 未重复下注

use chrono::Utc;
use ditebak_resource::models::{Bet, BetState, TopicState};
use ditebak_shared::error::{AppError, Result};
use ditebak_shared::observability::metrics;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::client::ResourceClient;
use crate::middleware::SessionContext;

/// 下注命令
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceBetCommand {
    /// 题目 id
    pub topic: String,
    pub prediction: String,
    /// 押上的声望值
    #[serde(alias = "reputation")]
    pub stake: i64,
}

#[derive(Clone)]
pub struct PlaceBetWorkflow {
    client: ResourceClient,
    max_stake: i64,
}

impl PlaceBetWorkflow {
    pub fn new(client: ResourceClient, max_stake: i64) -> Self {
        Self { client, max_stake }
    }

    #[instrument(skip(self, session, command), fields(email = %session.email, topic = %command.topic))]
    pub async fn place(&self, session: &SessionContext, command: &PlaceBetCommand) -> Result<Bet> {
        if command.stake < 1 || command.stake > self.max_stake {
            return Err(AppError::Validation(format!(
                "Reputation at stake must be between 1 and {}",
                self.max_stake
            )));
        }
        if command.topic.is_empty() {
            return Err(AppError::Validation("Topic can't be empty".to_string()));
        }

        let user = self
            .client
            .find_user_by_email(&session.email)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "You are not authenticated. Please login before placing bet".to_string(),
                )
            })?;
        let owner = user.id.unwrap_or_default();

        let topic = self.client.get_topic(&command.topic).await?;
        match topic.state {
            TopicState::Published => {}
            TopicState::Closed | TopicState::Answered => {
                return Err(AppError::Validation("Topic is already closed".to_string()));
            }
            TopicState::Draft => {
                return Err(AppError::Validation("Topic is not published yet".to_string()));
            }
        }
        if topic.is_past_closing(Utc::now()) {
            return Err(AppError::Validation("Topic is already closed".to_string()));
        }

        let existing = self
            .client
            .find_bets(&[
                ("topic", command.topic.as_str()),
                ("owner", owner.as_str()),
                ("page", "1"),
                ("size", "1"),
            ])
            .await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict("Bet already exists".to_string()));
        }

        let bet = self
            .client
            .create_bet(&Bet {
                topic_id: command.topic.clone(),
                owner,
                prediction: command.prediction.clone(),
                stake: command.stake,
                state: BetState::Placed,
                ..Default::default()
            })
            .await?;

        metrics::record_bet_placed();
        info!(bet_id = ?bet.id, stake = bet.stake, "下注成功");
        Ok(bet)
    }
}
