//! 测试辅助
//!
//! 在随机端口上启动真实的资源服务路由（内存存储），让网关客户端走真实 HTTP。

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::Router;
use chrono::{DateTime, Utc};
use ditebak_resource::models::{Bet, Topic, TopicPatch, TopicState, User, UserPatch};
use ditebak_resource::routes::api_routes;
use ditebak_resource::{AppState as ResourceState, MemoryDocumentStore};
use ditebak_shared::retry::RetryPolicy;

use crate::client::{GatewayClient, ResourceClient, UpstreamUrls};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
        multiplier: 1.0,
    }
}

fn client_for(base: &str, max_retries: u32) -> ResourceClient {
    let gateway = GatewayClient::new(Duration::from_secs(5), fast_retry(max_retries)).unwrap();
    ResourceClient::new(gateway, UpstreamUrls::from_base(base).unwrap())
}

/// 指向已关闭端口的客户端，所有调用都以传输错误失败
pub fn unreachable_client() -> ResourceClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    client_for(&format!("http://{addr}"), 0)
}

/// 运行中的资源服务
pub struct ResourceFixture {
    pub base_url: String,
    /// 绕过 HTTP 直接读写数据，用于准备与断言
    pub state: ResourceState,
}

impl ResourceFixture {
    pub async fn spawn() -> Self {
        let state = ResourceState::new(Arc::new(MemoryDocumentStore::new()));
        let app = api_routes(&state);
        Self::serve(state, app).await
    }

    /// 与 `spawn` 相同，但 `method` 且路径以 `prefix` 开头的请求一律返回 500
    pub async fn spawn_failing(method: Method, prefix: &'static str) -> Self {
        let state = ResourceState::new(Arc::new(MemoryDocumentStore::new()));
        let app = api_routes(&state).layer(middleware::from_fn(move |request: Request, next: Next| {
            let fail = request.method() == method && request.uri().path().starts_with(prefix);
            async move {
                if fail {
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                next.run(request).await
            }
        }));
        Self::serve(state, app).await
    }

    async fn serve(state: ResourceState, app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> ResourceClient {
        client_for(&self.base_url, 1)
    }

    /// 创建用户并设置声望，返回 id
    ///
    /// 创建钩子会把声望清零，所以声望通过后续更新写入
    pub async fn user(&self, email: &str, reputation: i64) -> String {
        let user = self
            .state
            .users
            .create(User {
                email: email.to_string(),
                display_name: email.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = user.id.unwrap();

        self.state
            .users
            .update(&id, UserPatch::reputation(reputation))
            .await
            .unwrap();
        id
    }

    /// 创建指定状态与截止时间的题目，返回 id
    pub async fn topic_in(&self, state: TopicState, closing_at: Option<DateTime<Utc>>) -> String {
        let topic = self
            .state
            .topics
            .create(Topic {
                question: "What is the answer?".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = topic.id.unwrap();

        self.state
            .topics
            .update(
                &id,
                TopicPatch {
                    state: Some(state),
                    closing_at,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        id
    }

    pub async fn published_topic(&self) -> String {
        self.topic_in(TopicState::Published, None).await
    }

    pub async fn bet(&self, topic: &str, owner: &str, prediction: &str, stake: i64) -> String {
        self.state
            .bets
            .create(Bet {
                topic_id: topic.to_string(),
                owner: owner.to_string(),
                prediction: prediction.to_string(),
                stake,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
            .unwrap()
    }
}
