use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{NewUser, User};

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken email fails with `Conflict`
    async fn create(&self, new_user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, newest first
    async fn list_all(&self) -> Result<Vec<User>>;

    /// Returns false when no user had this id
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
