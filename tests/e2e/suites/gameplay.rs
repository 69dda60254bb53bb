//! 玩法全链路测试套件
//!
//! 登录 -> 下注 -> 公布答案 -> 结算后检查声望与下注状态。

use crate::setup::TestEnvironment;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn published_topic(env: &TestEnvironment) -> String {
    let topic: Value = env
        .resources
        .create("topics", &json!({"question": "What is six times seven?"}))
        .await
        .unwrap();
    let id = topic["id"].as_str().unwrap().to_string();

    let _: Value = env
        .resources
        .patch("topics", &id, &json!({"state": "published"}))
        .await
        .unwrap();
    id
}

#[cfg(test)]
mod gameplay_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_guarded_routes_reject_anonymous() {
        let env = TestEnvironment::setup().await.unwrap();

        let reply = env.gateway.profile().await.unwrap();
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["message"], "You are not authenticated");
    }

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_bet_and_settle() {
        let env = TestEnvironment::setup().await.unwrap();
        let topic = published_topic(&env).await;

        let winner_email = TestEnvironment::unique_email("winner");
        let loser_email = TestEnvironment::unique_email("loser");
        let winner = env.login_as(&winner_email).await.unwrap();
        let loser = env.login_as(&loser_email).await.unwrap();

        let reply = winner.place_bet(&topic, "42", 3).await.unwrap();
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let reply = loser.place_bet(&topic, "41", 2).await.unwrap();
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        // 同一题目不能重复下注
        let reply = winner.place_bet(&topic, "43", 1).await.unwrap();
        assert_eq!(reply.status, StatusCode::CONFLICT);

        let reply = env.gateway.answer(&topic, "42").await.unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["data"], json!({"lost": 1, "won": 1, "total": 2}));

        let profile = winner.profile().await.unwrap();
        assert_eq!(profile.body["data"]["reputation"], 3);
        let profile = loser.profile().await.unwrap();
        assert_eq!(profile.body["data"]["reputation"], -2);

        let bets = winner.my_bets().await.unwrap();
        assert_eq!(bets.body["data"][0]["state"], "won");

        // 题目已结算，不能再下注
        let late = env.login_as(&TestEnvironment::unique_email("late")).await.unwrap();
        let reply = late.place_bet(&topic, "42", 1).await.unwrap();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["message"], "Topic is already closed");
    }

    #[tokio::test]
    #[ignore = "需要运行服务"]
    async fn test_stake_out_of_range() {
        let env = TestEnvironment::setup().await.unwrap();
        let topic = published_topic(&env).await;
        let player = env
            .login_as(&TestEnvironment::unique_email("stake"))
            .await
            .unwrap();

        let reply = player.place_bet(&topic, "42", 0).await.unwrap();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let reply = player.place_bet(&topic, "42", 11).await.unwrap();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }
}
