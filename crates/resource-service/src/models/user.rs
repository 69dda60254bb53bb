//! 用户实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Provider;
use crate::repository::{CollectionSpec, Entity};

/// 用户
///
/// `email` 是唯一身份键；`reputation` 从 0 开始，只由结算流程修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// 邮箱验证时间，未验证为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub provider: Provider,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: String,
    pub reputation: i64,
}

/// 用户部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation: Option<i64>,
}

impl UserPatch {
    /// 只修改声望的补丁
    pub fn reputation(value: i64) -> Self {
        Self {
            reputation: Some(value),
            ..Default::default()
        }
    }
}

impl Entity for User {
    type Patch = UserPatch;

    const COLLECTION: CollectionSpec = CollectionSpec {
        name: "users",
        unique_fields: &["email"],
        sort_field: "created_at",
        sort_descending: true,
    };
}
