//! 登录凭证实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{CollectionSpec, Entity};

/// 身份联合服务下发的令牌
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseCredential {
    pub id: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
    /// 过期时间（毫秒时间戳）
    pub expiration_time: i64,
}

/// Google OAuth 令牌
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleCredential {
    pub id: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// 登录凭证，按邮箱与用户关联
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub email: String,
    pub firebase: FirebaseCredential,
    pub google: GoogleCredential,
}

/// 凭证部分更新，令牌整体替换
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseCredential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleCredential>,
}

impl From<Credential> for CredentialPatch {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            updated_at: credential.updated_at,
            email: Some(credential.email),
            firebase: Some(credential.firebase),
            google: Some(credential.google),
        }
    }
}

impl Entity for Credential {
    type Patch = CredentialPatch;

    const COLLECTION: CollectionSpec = CollectionSpec {
        name: "credentials",
        unique_fields: &["email"],
        sort_field: "email",
        sort_descending: false,
    };
}
