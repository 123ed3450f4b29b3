use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity::dtos::ActivityResponseDto;
use crate::features::activity::models::{ActivityEntry, ActivityType, NewActivity};
use crate::features::activity::repositories::ActivityRepository;
use crate::features::auth::model::Identity;
use crate::shared::constants::RECENT_ACTIVITY_LIMIT;

/// Service for the append-only activity log
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    pub fn new(activities: Arc<dyn ActivityRepository>) -> Self {
        Self { activities }
    }

    /// Append one entry for `user_id`
    pub async fn record(
        &self,
        user_id: Uuid,
        activity_type: ActivityType,
        description: String,
    ) -> Result<ActivityEntry> {
        let entry = self
            .activities
            .append(NewActivity {
                user_id,
                activity_type,
                description,
            })
            .await?;

        debug!(
            "Activity recorded: user={}, type={}",
            entry.user_id, entry.activity_type
        );
        Ok(entry)
    }

    /// The caller's most recent entries, newest first
    pub async fn list_recent(&self, caller: &Identity) -> Result<Vec<ActivityResponseDto>> {
        let entries = self
            .activities
            .list_recent(caller.id, RECENT_ACTIVITY_LIMIT)
            .await?;

        Ok(entries.into_iter().map(ActivityResponseDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::shared::test_helpers::{test_identity, InMemoryActivityRepository};

    #[tokio::test]
    async fn test_list_recent_is_capped_and_newest_first() {
        let service = ActivityService::new(Arc::new(InMemoryActivityRepository::default()));
        let caller = test_identity(UserRole::User);

        for i in 0..60 {
            service
                .record(caller.id, ActivityType::Upload, format!("Uploaded file: {}.xlsx", i))
                .await
                .unwrap();
        }

        let recent = service.list_recent(&caller).await.unwrap();

        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].description, "Uploaded file: 59.xlsx");
        assert_eq!(recent[49].description, "Uploaded file: 10.xlsx");
    }

    #[tokio::test]
    async fn test_list_recent_only_returns_callers_entries() {
        let service = ActivityService::new(Arc::new(InMemoryActivityRepository::default()));
        let alice = test_identity(UserRole::User);
        let bob = test_identity(UserRole::Admin);

        service
            .record(alice.id, ActivityType::Upload, "Uploaded file: a.xlsx".into())
            .await
            .unwrap();
        service
            .record(bob.id, ActivityType::Delete, "Deleted file: b.xlsx".into())
            .await
            .unwrap();

        let recent = service.list_recent(&alice).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].activity_type, ActivityType::Upload);
    }
}
