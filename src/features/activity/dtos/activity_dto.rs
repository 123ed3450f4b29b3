use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::activity::models::{ActivityEntry, ActivityType};

/// Response DTO for one activity entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityResponseDto {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            activity_type: entry.activity_type,
            description: entry.description,
            created_at: entry.created_at,
        }
    }
}
