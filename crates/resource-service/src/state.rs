//! 应用状态定义

use std::sync::Arc;

use crate::models::{Bet, Credential, Topic, User};
use crate::repository::{DocumentStore, Repository};
use crate::resources::Resource;
use crate::service::ResourceService;

/// 资源服务共享状态
///
/// 四种资源共用同一个文档存储
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub users: ResourceService<User>,
    pub topics: ResourceService<Topic>,
    pub bets: ResourceService<Bet>,
    pub credentials: ResourceService<Credential>,
}

fn service_for<E: Resource>(store: &Arc<dyn DocumentStore>) -> ResourceService<E> {
    ResourceService::new(Repository::new(store.clone(), E::hooks()))
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: service_for(&store),
            topics: service_for(&store),
            bets: service_for(&store),
            credentials: service_for(&store),
            store,
        }
    }
}
