// Activity log: persisted rows plus the `audit` tracing target

use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    models::{Activity, ActivityAction},
    repositories::{ActivityRepository, RepositoryError},
    utils::AuditLogger,
};

#[derive(Clone)]
pub struct ActivityService {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Best effort: the mutation already succeeded, so a failed write is only logged
    #[instrument(skip(self, action, details), fields(action = action.as_str()))]
    pub async fn record(
        &self,
        action: ActivityAction,
        user_id: Uuid,
        entity_id: impl Into<String> + std::fmt::Debug,
        details: Value,
    ) {
        let activity = Activity::new(action, user_id, entity_id.into(), details);
        AuditLogger::log_activity(&activity);

        if let Err(e) = self.repository.record(activity).await {
            warn!("Failed to persist activity {}: {}", action.as_str(), e);
        }
    }

    pub async fn for_entity(&self, entity_id: &str) -> Result<Vec<Activity>, RepositoryError> {
        self.repository.for_entity(entity_id).await
    }
}
