//! 用户资源

use std::sync::Arc;

use chrono::Utc;

use super::Resource;
use crate::models::{User, UserPatch};
use crate::query::{QuerySchema, Queryable};
use crate::repository::{LifecycleHooks, UpdateOptions};

pub struct UserHooks;

impl LifecycleHooks<User> for UserHooks {
    fn on_will_create(&self, user: &mut User) {
        user.created_at = Some(Utc::now());
        user.reputation = 0;
    }

    fn on_did_create(&self, user: &mut User, id: &str) {
        user.id = Some(id.to_string());
    }

    fn on_will_update(&self, patch: &mut UserPatch, options: &mut UpdateOptions) {
        patch.updated_at = Some(Utc::now());
        options.upsert = true;
    }

    fn on_did_update(&self, patch: &mut UserPatch, upserted_id: Option<&str>) {
        if let Some(id) = upserted_id {
            patch.id = Some(id.to_string());
        }
    }
}

impl Resource for User {
    fn hooks() -> Arc<dyn LifecycleHooks<Self>> {
        Arc::new(UserHooks)
    }

    fn query_schema() -> QuerySchema {
        QuerySchema::new(vec![Queryable::text("provider"), Queryable::text("email")])
    }
}
