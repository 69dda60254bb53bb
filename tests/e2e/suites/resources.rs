//! 资源服务测试套件
//!
//! 直接调用资源服务，验证通用 CRUD 语义。

use crate::setup::TestEnvironment;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[cfg(test)]
mod crud_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_user_lifecycle() {
        let env = TestEnvironment::setup().await.unwrap();
        let email = TestEnvironment::unique_email("crud");

        // 创建时声望被重置为 0
        let user: Value = env
            .resources
            .create("users", &json!({"email": email, "reputation": 99}))
            .await
            .unwrap();
        let id = user["id"].as_str().unwrap().to_string();
        assert_eq!(user["reputation"], 0);
        assert!(user["created_at"].is_string());

        let updated: Value = env
            .resources
            .patch("users", &id, &json!({"reputation": 5}))
            .await
            .unwrap();
        assert_eq!(updated["reputation"], 5);
        assert_eq!(updated["email"], Value::String(email.clone()));

        let reply = env
            .resources
            .list("users", &format!("email={}", email))
            .await
            .unwrap();
        assert_eq!(reply.body["paging"]["total_data"], 1);

        // 软删除后不可见，重复删除仍然成功
        assert_eq!(
            env.resources.delete("users", &id).await.unwrap(),
            StatusCode::RESET_CONTENT
        );
        assert_eq!(
            env.resources.delete("users", &id).await.unwrap(),
            StatusCode::RESET_CONTENT
        );
        let reply = env.resources.get("users", &id).await.unwrap();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        assert_eq!(
            env.resources.remove("users", &id).await.unwrap(),
            StatusCode::RESET_CONTENT
        );
    }

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_duplicate_email_conflicts() {
        let env = TestEnvironment::setup().await.unwrap();
        let email = TestEnvironment::unique_email("dup");

        let user: Value = env
            .resources
            .create("users", &json!({"email": email}))
            .await
            .unwrap();

        let reply = env
            .resources
            .send(
                reqwest::Method::POST,
                "/users",
                Some(json!({"email": email})),
            )
            .await
            .unwrap();
        assert_eq!(reply.status, StatusCode::CONFLICT);
        assert_eq!(reply.body["message"], "Duplicate resource already exists");

        env.resources
            .remove("users", user["id"].as_str().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_topic_state_filter_and_paging() {
        let env = TestEnvironment::setup().await.unwrap();

        let topic: Value = env
            .resources
            .create("topics", &json!({"question": "e2e paging"}))
            .await
            .unwrap();
        assert_eq!(topic["state"], "draft");
        let id = topic["id"].as_str().unwrap().to_string();

        let reply = env
            .resources
            .list("topics", "state=draft,published&page=1&size=1")
            .await
            .unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["data"].as_array().unwrap().len(), 1);
        let total = reply.body["paging"]["total_data"].as_u64().unwrap();
        assert_eq!(reply.body["paging"]["total_page"].as_u64().unwrap(), total);

        env.resources.remove("topics", &id).await.unwrap();
    }
}
