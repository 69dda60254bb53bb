//! 结算流程
//!
//! 公布答案后结算题目下所有待结算的下注：
//! 1. 把题目标记为 answered 并写入答案，失败则整体中止
//! 2. 按 `topic = id AND state = placed` 分页拉取全部下注
//! 3. 逐笔判定输赢并计数
//! 4. 逐笔写回下注状态，失败记录日志后继续
//! 5. 逐笔调整下注用户的声望，失败记录日志后继续
//!
//! 下注自身的 state 字段就是进度检查点：已离开 placed 的下注不会被再次拉取，
//! 因此中途失败后重新执行是安全的。同一题目上并发执行两次结算没有任何互斥保护，
//! 可能重复调整声望。

use ditebak_resource::models::{Bet, BetPatch, BetState, TopicPatch, TopicState, UserPatch};
use ditebak_shared::error::{AppError, Result};
use ditebak_shared::observability::metrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::client::ResourceClient;

/// 结算时每页拉取的下注数
pub const SETTLEMENT_PAGE_SIZE: u32 = 100;

/// 公布答案命令
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnswerCommand {
    pub topic: String,
    pub answer: String,
    /// 同样算作正确的其他写法
    pub variations: Vec<String>,
}

impl AnswerCommand {
    /// 去掉首尾空白后与答案或任一变体完全相同即为正确，区分大小写
    pub fn is_correct(&self, prediction: &str) -> bool {
        let prediction = prediction.trim();
        prediction == self.answer.trim()
            || self
                .variations
                .iter()
                .any(|variation| prediction == variation.trim())
    }

    fn validate(&self) -> Result<()> {
        if self.topic.is_empty() {
            return Err(AppError::Validation("Topic can't be empty".to_string()));
        }
        if self.answer.is_empty() {
            return Err(AppError::Validation("Answer can't be empty".to_string()));
        }
        Ok(())
    }
}

/// 结算统计
///
/// 按判定结果计数，不因后续写回失败而修正
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerStats {
    pub lost: u64,
    pub won: u64,
    pub total: u64,
}

impl AnswerStats {
    fn tally(&mut self, outcome: BetState) {
        match outcome {
            BetState::Won => self.won += 1,
            BetState::Lost => self.lost += 1,
            BetState::Placed => return,
        }
        self.total = self.won + self.lost;
    }
}

/// 声望变化量，未结算的下注不产生变化
fn reputation_delta(outcome: BetState, stake: i64) -> Option<i64> {
    match outcome {
        BetState::Won => Some(stake),
        BetState::Lost => Some(-stake),
        BetState::Placed => None,
    }
}

/// 结算流程
#[derive(Clone)]
pub struct SettlementWorkflow {
    client: ResourceClient,
}

impl SettlementWorkflow {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// 公布答案并结算
    #[instrument(skip(self, command), fields(topic = %command.topic))]
    pub async fn settle(&self, command: &AnswerCommand) -> Result<AnswerStats> {
        command.validate()?;

        let patch = TopicPatch {
            answer: Some(command.answer.clone()),
            variations: Some(command.variations.clone()),
            state: Some(TopicState::Answered),
            ..Default::default()
        };
        if let Err(e) = self.client.patch_topic(&command.topic, &patch).await {
            error!(error = %e, "题目标记为已公布答案失败，结算中止");
            metrics::record_settlement_failure("topic");
            return Err(e);
        }

        let bets = self.collect_placed_bets(&command.topic).await?;
        if bets.is_empty() {
            info!("题目没有待结算的下注");
            return Ok(AnswerStats::default());
        }

        let mut stats = AnswerStats::default();
        let classified: Vec<(Bet, BetState)> = bets
            .into_iter()
            .map(|bet| {
                let outcome = if command.is_correct(&bet.prediction) {
                    BetState::Won
                } else {
                    BetState::Lost
                };
                stats.tally(outcome);
                (bet, outcome)
            })
            .collect();

        for (bet, outcome) in &classified {
            self.update_bet(bet, *outcome).await;
        }

        for (bet, outcome) in &classified {
            self.adjust_reputation(bet, *outcome).await;
        }

        info!(won = stats.won, lost = stats.lost, total = stats.total, "结算完成");
        Ok(stats)
    }

    /// 分页拉取全部 placed 状态的下注，直到返回空页
    async fn collect_placed_bets(&self, topic: &str) -> Result<Vec<Bet>> {
        let size = SETTLEMENT_PAGE_SIZE.to_string();
        let placed = BetState::Placed.as_str();
        let mut bets = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let params = [
                ("topic", topic),
                ("state", placed),
                ("page", page_param.as_str()),
                ("size", size.as_str()),
            ];

            let partial = self.client.find_bets(&params).await.map_err(|e| {
                error!(error = %e, page, "拉取待结算下注失败，结算中止");
                metrics::record_settlement_failure("collect");
                e
            })?;

            if partial.is_empty() {
                break;
            }
            debug!(page, count = partial.len(), "拉取到一页待结算下注");
            bets.extend(partial);
            page += 1;
        }

        Ok(bets)
    }

    async fn update_bet(&self, bet: &Bet, outcome: BetState) {
        let Some(id) = bet.id.as_deref() else {
            warn!(owner = %bet.owner, "下注缺少 id，跳过状态更新");
            return;
        };

        match self.client.patch_bet(id, &BetPatch::state(outcome)).await {
            Ok(()) => metrics::record_settled_bet(outcome.as_str()),
            Err(e) => {
                error!(bet_id = %id, owner = %bet.owner, error = %e, "更新下注状态失败");
                metrics::record_settlement_failure("bet");
            }
        }
    }

    async fn adjust_reputation(&self, bet: &Bet, outcome: BetState) {
        let Some(delta) = reputation_delta(outcome, bet.stake) else {
            warn!(bet_id = ?bet.id, state = outcome.as_str(), "未知的下注结果，跳过声望调整");
            return;
        };

        let user = match self.client.get_user(&bet.owner).await {
            Ok(user) => user,
            Err(e) => {
                error!(bet_id = ?bet.id, owner = %bet.owner, error = %e, "获取下注用户失败");
                metrics::record_settlement_failure("reputation");
                return;
            }
        };

        let reputation = user.reputation + delta;
        if let Err(e) = self
            .client
            .patch_user(&bet.owner, &UserPatch::reputation(reputation))
            .await
        {
            error!(bet_id = ?bet.id, owner = %bet.owner, error = %e, "更新用户声望失败");
            metrics::record_settlement_failure("reputation");
            return;
        }

        debug!(owner = %bet.owner, delta, reputation, "声望已调整");
    }
}
