//! 登录流程
//!
//! 身份联合服务登录成功后，前端把完整的登录结果提交到网关：
//! - 新身份：创建用户与凭证
//! - 已有身份：按邮箱查出凭证与用户，以凭证 id 为键更新凭证
//!
//! 写入前先校验 ID Token，最后签发会话令牌。

use std::sync::Arc;

use chrono::{Duration, Utc};
use ditebak_resource::models::{
    Credential, CredentialPatch, FirebaseCredential, GoogleCredential, Provider, User,
};
use ditebak_shared::error::{AppError, Result};
use ditebak_shared::observability::metrics;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::client::ResourceClient;
use crate::identity::IdentityProvider;

const GOOGLE_PROVIDER_ID: &str = "google.com";

// ==================== 登录载荷 ====================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenManager {
    pub refresh_token: String,
    pub access_token: String,
    /// 毫秒时间戳
    pub expiration_time: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginUser {
    pub uid: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub email: String,
    pub email_verified: bool,
    pub sts_token_manager: TokenManager,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OAuthCredential {
    pub provider_id: String,
    pub sign_in_method: String,
    pub oauth_id_token: String,
    pub oauth_access_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub picture: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalUserInfo {
    pub provider_id: String,
    pub is_new_user: bool,
    pub profile: Profile,
}

/// 身份联合服务的登录结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginCommand {
    pub user: LoginUser,
    pub credential: OAuthCredential,
    pub additional_user_info: AdditionalUserInfo,
}

impl LoginCommand {
    fn id_token(&self) -> &str {
        &self.user.sts_token_manager.access_token
    }

    fn to_user(&self) -> User {
        let provider = if self.credential.provider_id == GOOGLE_PROVIDER_ID {
            Provider::Google
        } else {
            Provider::Email
        };

        User {
            verified_at: self.user.email_verified.then(Utc::now),
            provider,
            email: self.user.email.clone(),
            display_name: self.user.display_name.clone(),
            first_name: self.additional_user_info.profile.given_name.clone(),
            last_name: self.additional_user_info.profile.family_name.clone(),
            photo: self.user.photo_url.clone(),
            reputation: 0,
            ..Default::default()
        }
    }

    fn to_credential(&self) -> Credential {
        let tokens = &self.user.sts_token_manager;
        Credential {
            email: self.user.email.clone(),
            firebase: FirebaseCredential {
                id: self.user.uid.clone(),
                id_token: String::new(),
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                expiration_time: tokens.expiration_time,
            },
            google: GoogleCredential {
                id: self.additional_user_info.profile.id.clone(),
                id_token: self.credential.oauth_id_token.clone(),
                access_token: self.credential.oauth_access_token.clone(),
                refresh_token: String::new(),
            },
            ..Default::default()
        }
    }
}

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: String,
    pub user: User,
}

fn credential_error() -> AppError {
    AppError::Internal("Failed to authenticate credential".to_string())
}

#[derive(Clone)]
pub struct LoginWorkflow {
    client: ResourceClient,
    identity: Arc<dyn IdentityProvider>,
    session_duration: Duration,
}

impl LoginWorkflow {
    pub fn new(
        client: ResourceClient,
        identity: Arc<dyn IdentityProvider>,
        session_duration: Duration,
    ) -> Self {
        Self {
            client,
            identity,
            session_duration,
        }
    }

    #[instrument(skip(self, command), fields(email = %command.user.email, new_user = command.additional_user_info.is_new_user))]
    pub async fn login(&self, command: &LoginCommand) -> Result<LoginOutcome> {
        self.identity.verify_id_token(command.id_token()).await?;

        let credential = command.to_credential();
        let is_new_user = command.additional_user_info.is_new_user;

        let user = if is_new_user {
            let user = self.client.create_user(&command.to_user()).await?;
            self.client.create_credential(&credential).await?;
            user
        } else {
            let existing = self
                .client
                .find_credential_by_email(&command.user.email)
                .await?
                .ok_or_else(credential_error)?;
            let user = self
                .client
                .find_user_by_email(&command.user.email)
                .await?
                .ok_or_else(credential_error)?;

            let id = existing.id.ok_or_else(credential_error)?;
            let mut patch = CredentialPatch::from(credential);
            patch.id = None;
            self.client.patch_credential(&id, &patch).await?;
            user
        };

        let session = self
            .identity
            .create_session(command.id_token(), self.session_duration)
            .await?;

        metrics::record_login(is_new_user);
        info!(user_id = ?user.id, "登录成功");
        Ok(LoginOutcome { session, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityClaims, MockIdentityProvider};
    use crate::test_support::ResourceFixture;
    use ditebak_resource::repository::FindOptions;
    use serde_json::json;

    fn login_payload(email: &str, is_new_user: bool) -> LoginCommand {
        serde_json::from_value(json!({
            "user": {
                "uid": "fb-uid",
                "displayName": "Alice A",
                "photoURL": "https://img/alice.png",
                "email": email,
                "emailVerified": true,
                "stsTokenManager": {
                    "accessToken": "id-token",
                    "refreshToken": "refresh",
                    "expirationTime": 1_700_000_000_000i64
                }
            },
            "credential": {
                "providerId": "google.com",
                "oauthIdToken": "g-id",
                "oauthAccessToken": "g-access"
            },
            "additionalUserInfo": {
                "providerId": "google.com",
                "isNewUser": is_new_user,
                "profile": {"id": "g-uid", "given_name": "Alice", "family_name": "A"}
            }
        }))
        .unwrap()
    }

    fn accepting_identity() -> Arc<dyn IdentityProvider> {
        let mut identity = MockIdentityProvider::new();
        identity.expect_verify_id_token().returning(|_| {
            Ok(IdentityClaims {
                sub: "fb-uid".into(),
                email: "alice@x.io".into(),
                iat: 0,
                exp: 0,
                iss: "ditebak".into(),
            })
        });
        identity
            .expect_create_session()
            .returning(|_, _| Ok("session-token".to_string()));
        Arc::new(identity)
    }

    #[test]
    fn test_payload_mapping() {
        let command = login_payload("alice@x.io", true);

        let user = command.to_user();
        assert_eq!(user.provider, Provider::Google);
        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.photo, "https://img/alice.png");
        assert!(user.verified_at.is_some());

        let credential = command.to_credential();
        assert_eq!(credential.firebase.id, "fb-uid");
        assert_eq!(credential.firebase.refresh_token, "refresh");
        assert_eq!(credential.google.id_token, "g-id");
    }

    #[tokio::test]
    async fn test_new_user_then_returning_user() {
        let fixture = ResourceFixture::spawn().await;
        let workflow = LoginWorkflow::new(
            fixture.client(),
            accepting_identity(),
            Duration::hours(120),
        );

        let first = workflow
            .login(&login_payload("alice@x.io", true))
            .await
            .unwrap();
        assert_eq!(first.session, "session-token");
        assert_eq!(first.user.email, "alice@x.io");
        assert!(first.user.id.is_some());

        let mut again = login_payload("alice@x.io", false);
        again.user.sts_token_manager.refresh_token = "refresh-2".into();
        let second = workflow.login(&again).await.unwrap();
        assert_eq!(second.user.id, first.user.id);

        let (total, credentials) = fixture
            .state
            .credentials
            .find(FindOptions::new(1, 5))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(credentials[0].firebase.refresh_token, "refresh-2");
    }

    #[tokio::test]
    async fn test_returning_user_without_credential_fails() {
        let fixture = ResourceFixture::spawn().await;
        let workflow = LoginWorkflow::new(
            fixture.client(),
            accepting_identity(),
            Duration::hours(120),
        );

        let err = workflow
            .login(&login_payload("alice@x.io", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.to_string(), "Failed to authenticate credential");
    }

    #[tokio::test]
    async fn test_invalid_token_writes_nothing() {
        let fixture = ResourceFixture::spawn().await;
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_verify_id_token()
            .returning(|_| Err(AppError::Unauthorized("Invalid token".into())));
        identity.expect_create_session().never();

        let workflow = LoginWorkflow::new(fixture.client(), Arc::new(identity), Duration::hours(1));
        let err = workflow
            .login(&login_payload("alice@x.io", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let (total, _) = fixture.state.users.find(FindOptions::new(1, 5)).await.unwrap();
        assert_eq!(total, 0);
    }
}
