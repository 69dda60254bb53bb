//! 应用状态定义

use std::sync::Arc;

use chrono::Duration;
use ditebak_shared::config::GatewayConfig;

use crate::client::ResourceClient;
use crate::identity::IdentityProvider;
use crate::middleware::CookieSettings;
use crate::workflow::{GamblerQueries, LoginWorkflow, PlaceBetWorkflow, SettlementWorkflow};

/// 网关共享状态
#[derive(Clone)]
pub struct AppState {
    pub client: ResourceClient,
    pub identity: Arc<dyn IdentityProvider>,
    pub settlement: SettlementWorkflow,
    pub place_bet: PlaceBetWorkflow,
    pub login: LoginWorkflow,
    pub gambler: GamblerQueries,
    pub cookie: CookieSettings,
}

impl AppState {
    /// `production` 为真时会话 Cookie 带上 Domain 与 Secure
    pub fn new(
        client: ResourceClient,
        identity: Arc<dyn IdentityProvider>,
        config: &GatewayConfig,
        production: bool,
    ) -> Self {
        let session_duration = Duration::hours(config.session_duration_hours);

        Self {
            settlement: SettlementWorkflow::new(client.clone()),
            place_bet: PlaceBetWorkflow::new(client.clone(), config.max_stake),
            login: LoginWorkflow::new(client.clone(), identity.clone(), session_duration),
            gambler: GamblerQueries::new(client.clone()),
            cookie: CookieSettings {
                max_age_secs: session_duration.num_seconds(),
                domain: production.then(|| config.cookie_domain.clone()),
            },
            client,
            identity,
        }
    }
}
