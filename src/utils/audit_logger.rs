// Audit logging for catalog mutations
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Activity;

#[derive(Debug, Serialize)]
pub struct AuditLog<'a> {
    pub id: Uuid,
    pub action: &'a str,
    pub user_id: Uuid,
    pub resource_id: &'a str,
    pub resource_type: &'a str,
    pub details: &'a serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

pub struct AuditLogger;

impl AuditLogger {
    /// Mirror an activity record to the `audit` tracing target
    pub fn log_activity(activity: &Activity) {
        let audit_log = AuditLog {
            id: activity.id,
            action: &activity.action,
            user_id: activity.user_id,
            resource_id: &activity.entity_id,
            resource_type: &activity.entity_type,
            details: &activity.details,
            timestamp: activity.created_at,
        };

        let json_log = serde_json::to_string(&audit_log).unwrap_or_else(|e| {
            warn!("Failed to serialize audit log: {}", e);
            format!("{:?}", audit_log)
        });

        info!(target: "audit", "{}", json_log);
    }
}
