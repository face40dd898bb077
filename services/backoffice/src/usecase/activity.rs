use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::ActivityLogRepository;
use crate::domain::types::{ActivityLevel, ActivityLog};

/// Best-effort audit channel. Every mutating usecase calls `record` after
/// its primary write; an append failure is logged and swallowed so the
/// business action is never rolled back or failed by its audit trail.
pub struct ActivityRecorder<A: ActivityLogRepository> {
    pub repo: A,
}

impl<A: ActivityLogRepository> ActivityRecorder<A> {
    pub async fn record(
        &self,
        user_id: Uuid,
        verb: impl Into<String>,
        level: ActivityLevel,
        icon: &str,
    ) {
        let entry = ActivityLog {
            id: Uuid::now_v7(),
            user_id: Some(user_id),
            verb: verb.into(),
            level,
            icon: icon.to_owned(),
            created_at: Utc::now(),
        };
        if let Err(error) = self.repo.append(&entry).await {
            tracing::warn!(error = %error, verb = %entry.verb, "activity log append failed");
        }
    }
}
