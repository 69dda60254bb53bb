//! 题目资源

use std::sync::Arc;

use chrono::Utc;

use super::Resource;
use crate::models::{Topic, TopicPatch, TopicState};
use crate::query::{self, QuerySchema, Queryable};
use crate::repository::{LifecycleHooks, UpdateOptions};

pub struct TopicHooks;

impl LifecycleHooks<Topic> for TopicHooks {
    /// 新题目一律从草稿开始
    fn on_will_create(&self, topic: &mut Topic) {
        topic.created_at = Some(Utc::now());
        topic.state = TopicState::Draft;
    }

    fn on_did_create(&self, topic: &mut Topic, id: &str) {
        topic.id = Some(id.to_string());
    }

    fn on_will_update(&self, patch: &mut TopicPatch, options: &mut UpdateOptions) {
        patch.updated_at = Some(Utc::now());
        options.upsert = true;
    }

    fn on_did_update(&self, patch: &mut TopicPatch, upserted_id: Option<&str>) {
        if let Some(id) = upserted_id {
            patch.id = Some(id.to_string());
        }
    }
}

impl Resource for Topic {
    fn hooks() -> Arc<dyn LifecycleHooks<Self>> {
        Arc::new(TopicHooks)
    }

    /// `?state=published,closed` 匹配任意一个状态
    fn query_schema() -> QuerySchema {
        QuerySchema::new(vec![Queryable::list("state").transform(query::any_of)])
    }
}
