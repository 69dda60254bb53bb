//! 下注实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::BetState;
use crate::repository::{CollectionSpec, Entity};

/// 下注
///
/// 同一用户在同一题目上最多只有一条未删除的下注，由下注流程查重保证
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub topic_id: String,
    /// 下注用户的 id
    pub owner: String,
    pub prediction: String,
    /// 押上的声望值
    #[serde(rename = "reputation")]
    pub stake: i64,
    pub state: BetState,
}

/// 下注部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(rename = "reputation", skip_serializing_if = "Option::is_none")]
    pub stake: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<BetState>,
}

impl BetPatch {
    /// 只修改状态的补丁
    pub fn state(state: BetState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

impl Entity for Bet {
    type Patch = BetPatch;

    const COLLECTION: CollectionSpec = CollectionSpec {
        name: "bets",
        unique_fields: &[],
        sort_field: "created_at",
        sort_descending: true,
    };
}
