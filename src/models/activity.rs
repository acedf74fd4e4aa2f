// Activity log record written alongside catalog mutations

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityAction {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ProductModulesUpdated,
    ServiceCreated,
    ServiceUpdated,
    ServiceDeleted,
    ServicesBulkUpdated,
    ServicesBulkDeleted,
    PostCreated,
    PostUpdated,
    PostDeleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ProductCreated => "product.created",
            ActivityAction::ProductUpdated => "product.updated",
            ActivityAction::ProductDeleted => "product.deleted",
            ActivityAction::ProductModulesUpdated => "product.modules_updated",
            ActivityAction::ServiceCreated => "service.created",
            ActivityAction::ServiceUpdated => "service.updated",
            ActivityAction::ServiceDeleted => "service.deleted",
            ActivityAction::ServicesBulkUpdated => "services.bulk_updated",
            ActivityAction::ServicesBulkDeleted => "services.bulk_deleted",
            ActivityAction::PostCreated => "post.created",
            ActivityAction::PostUpdated => "post.updated",
            ActivityAction::PostDeleted => "post.deleted",
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            ActivityAction::ProductCreated
            | ActivityAction::ProductUpdated
            | ActivityAction::ProductDeleted
            | ActivityAction::ProductModulesUpdated => "product",
            ActivityAction::ServiceCreated
            | ActivityAction::ServiceUpdated
            | ActivityAction::ServiceDeleted
            | ActivityAction::ServicesBulkUpdated
            | ActivityAction::ServicesBulkDeleted => "service",
            ActivityAction::PostCreated | ActivityAction::PostUpdated | ActivityAction::PostDeleted => {
                "post"
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: String,
    /// Single id, or a comma-joined list for bulk actions
    pub entity_id: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(action: ActivityAction, user_id: Uuid, entity_id: String, details: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action: action.as_str().to_string(),
            entity_type: action.entity_type().to_string(),
            entity_id,
            details,
            created_at: Utc::now(),
        }
    }
}
