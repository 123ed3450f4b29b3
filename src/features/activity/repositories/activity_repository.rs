use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::{ActivityEntry, NewActivity};

/// Append-only activity log store
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn append(&self, activity: NewActivity) -> Result<ActivityEntry>;

    /// Entries of one user, newest first, at most `limit`
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<ActivityEntry>>;
}

pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn append(&self, activity: NewActivity) -> Result<ActivityEntry> {
        sqlx::query_as::<_, ActivityEntry>(
            r#"
            INSERT INTO activities (user_id, activity_type, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, activity_type, description, created_at
            "#,
        )
        .bind(activity.user_id)
        .bind(activity.activity_type.as_str())
        .bind(&activity.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append activity: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<ActivityEntry>> {
        sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, user_id, activity_type, description, created_at
            FROM activities
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}
