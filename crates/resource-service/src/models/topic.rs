//! 题目实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::TopicState;
use crate::repository::{CollectionSpec, Entity};

/// 题目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// 下注截止时间，为空表示不截止
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_at: Option<DateTime<Utc>>,
    pub banner: String,
    pub question: String,
    /// 公布的正确答案
    pub answer: String,
    /// 同样判定为正确的答案写法
    pub variations: Vec<String>,
    pub context: String,
    pub state: TopicState,
}

impl Topic {
    /// `now` 是否已超过截止时间
    pub fn is_past_closing(&self, now: DateTime<Utc>) -> bool {
        self.closing_at.is_some_and(|closing| now > closing)
    }
}

/// 题目部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TopicState>,
}

impl Entity for Topic {
    type Patch = TopicPatch;

    const COLLECTION: CollectionSpec = CollectionSpec {
        name: "topics",
        unique_fields: &[],
        sort_field: "created_at",
        sort_descending: true,
    };
}
