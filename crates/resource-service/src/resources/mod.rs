//! 资源定义
//!
//! 每种资源提供两样东西：生命周期钩子和可过滤字段表，
//! 通用的服务层与 REST 控制器据此为它提供 CRUD。

use std::sync::Arc;

use crate::models::{Bet, Credential, Topic, User};
use crate::query::QuerySchema;
use crate::repository::{CollectionSpec, Entity, LifecycleHooks};

pub mod bet;
pub mod credential;
pub mod topic;
pub mod user;

/// 可通过 REST 暴露的资源
pub trait Resource: Entity {
    fn hooks() -> Arc<dyn LifecycleHooks<Self>>;

    fn query_schema() -> QuerySchema;
}

/// 服务启动时需要准备的全部集合
pub const COLLECTIONS: [CollectionSpec; 4] = [
    User::COLLECTION,
    Topic::COLLECTION,
    Bet::COLLECTION,
    Credential::COLLECTION,
];
