//! 资源状态枚举
//!
//! 所有状态都是封闭的枚举，JSON 中以小写字符串表示

use serde::{Deserialize, Serialize};

/// 题目状态
///
/// 单向流转：draft -> published -> closed | answered，answered 为终态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicState {
    /// 草稿 - 编辑中，不接受下注
    #[default]
    Draft,
    /// 已发布 - 接受下注
    Published,
    /// 已截止 - 停止下注，等待答案
    Closed,
    /// 已公布答案 - 所有下注已结算
    Answered,
}

impl TopicState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Closed => "closed",
            Self::Answered => "answered",
        }
    }
}

/// 下注状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetState {
    /// 已下注，等待结算
    #[default]
    Placed,
    Won,
    Lost,
}

impl BetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

/// 用户登录来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
    #[default]
    Email,
    Bot,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Email => "email",
            Self::Bot => "bot",
        }
    }
}
