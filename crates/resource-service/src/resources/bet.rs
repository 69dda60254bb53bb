//! 下注资源

use std::sync::Arc;

use chrono::Utc;

use super::Resource;
use crate::models::{Bet, BetPatch, BetState};
use crate::query::{QuerySchema, Queryable};
use crate::repository::{LifecycleHooks, UpdateOptions};

pub struct BetHooks;

impl LifecycleHooks<Bet> for BetHooks {
    fn on_will_create(&self, bet: &mut Bet) {
        bet.created_at = Some(Utc::now());
        bet.state = BetState::Placed;
    }

    fn on_did_create(&self, bet: &mut Bet, id: &str) {
        bet.id = Some(id.to_string());
    }

    fn on_will_update(&self, patch: &mut BetPatch, options: &mut UpdateOptions) {
        patch.updated_at = Some(Utc::now());
        options.upsert = true;
    }

    fn on_did_update(&self, patch: &mut BetPatch, upserted_id: Option<&str>) {
        if let Some(id) = upserted_id {
            patch.id = Some(id.to_string());
        }
    }
}

impl Resource for Bet {
    fn hooks() -> Arc<dyn LifecycleHooks<Self>> {
        Arc::new(BetHooks)
    }

    fn query_schema() -> QuerySchema {
        QuerySchema::new(vec![
            Queryable::text("topic").stored_as("topic_id"),
            Queryable::text("owner"),
            Queryable::text("state"),
        ])
    }
}
