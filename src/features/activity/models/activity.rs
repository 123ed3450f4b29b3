use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of user action recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Upload,
    Download,
    View,
    Delete,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Upload => "upload",
            ActivityType::Download => "download",
            ActivityType::View => "view",
            ActivityType::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown activity type: {0}")]
pub struct UnknownActivityType(pub String);

impl TryFrom<String> for ActivityType {
    type Error = UnknownActivityType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "upload" => Ok(ActivityType::Upload),
            "download" => Ok(ActivityType::Download),
            "view" => Ok(ActivityType::View),
            "delete" => Ok(ActivityType::Delete),
            _ => Err(UnknownActivityType(value)),
        }
    }
}

/// Database model for activity entries (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub activity_type: ActivityType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Data for appending an activity entry
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
}
