//! 凭证资源

use std::sync::Arc;

use chrono::Utc;

use super::Resource;
use crate::models::{Credential, CredentialPatch};
use crate::query::{QuerySchema, Queryable};
use crate::repository::{LifecycleHooks, UpdateOptions};

pub struct CredentialHooks;

impl LifecycleHooks<Credential> for CredentialHooks {
    fn on_will_create(&self, credential: &mut Credential) {
        credential.created_at = Some(Utc::now());
    }

    fn on_did_create(&self, credential: &mut Credential, id: &str) {
        credential.id = Some(id.to_string());
    }

    fn on_will_update(&self, patch: &mut CredentialPatch, options: &mut UpdateOptions) {
        patch.updated_at = Some(Utc::now());
        options.upsert = true;
    }

    fn on_did_update(&self, patch: &mut CredentialPatch, upserted_id: Option<&str>) {
        if let Some(id) = upserted_id {
            patch.id = Some(id.to_string());
        }
    }
}

impl Resource for Credential {
    fn hooks() -> Arc<dyn LifecycleHooks<Self>> {
        Arc::new(CredentialHooks)
    }

    fn query_schema() -> QuerySchema {
        QuerySchema::new(vec![Queryable::text("email")])
    }
}
