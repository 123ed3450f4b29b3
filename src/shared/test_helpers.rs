//! Fixtures shared by unit and router tests: a fixed-secret token service,
//! identities, and in-memory repositories standing in for Postgres.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::activity::models::{ActivityEntry, NewActivity};
use crate::features::activity::{ActivityRepository, ActivityService};
use crate::features::auth::model::{Identity, UserRole};
use crate::features::auth::TokenService;
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::{FileRepository, FileService};
use crate::features::users::models::{NewUser, User};
use crate::features::users::UserRepository;
use crate::modules::storage::LocalBlobStore;

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        jwt_leeway: Duration::from_secs(0),
    }
}

pub fn test_token_service() -> TokenService {
    TokenService::new(&test_auth_config())
}

pub fn test_identity(role: UserRole) -> Identity {
    let id = Uuid::new_v4();
    Identity {
        id,
        email: format!("{}@example.com", id.simple()),
        name: "Test User".to_string(),
        role,
    }
}

/// In-memory file service writing blobs under `upload_dir`, with a 1 MiB cap
pub fn test_file_service(
    upload_dir: &Path,
) -> (
    Arc<FileService>,
    Arc<InMemoryFileRepository>,
    Arc<InMemoryActivityRepository>,
) {
    let files = Arc::new(InMemoryFileRepository::default());
    let activities = Arc::new(InMemoryActivityRepository::default());
    let service = FileService::new(
        files.clone(),
        Arc::new(LocalBlobStore::new(upload_dir)),
        Arc::new(ActivityService::new(activities.clone())),
        1024 * 1024,
    );
    (Arc::new(service), files, activities)
}

/// Skip the bearer check and attach `identity` to every request
pub fn with_identity(router: Router, identity: Identity) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let identity = identity.clone();
            async move {
                request.extensions_mut().insert(identity);
                next.run(request).await
            }
        },
    ))
}

/// Single-sheet xlsx built from string cells; empty strings are left blank
pub fn sample_workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                sheet.write_string(r as u32, c as u16, *cell).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.iter().rev().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: RwLock<Vec<FileRecord>>,
}

impl InMemoryFileRepository {
    pub async fn count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord> {
        let now = Utc::now();
        let file = FileRecord {
            id: Uuid::new_v4(),
            filename: record.filename,
            original_name: record.original_name,
            path: record.path,
            size: record.size,
            mimetype: record.mimetype,
            owner_id: record.owner_id,
            columns: record.columns,
            row_count: record.row_count,
            created_at: now,
            updated_at: now,
        };
        self.files.write().await.push(file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>> {
        Ok(self.files.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<FileRecord>> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .rev()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok(files.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryActivityRepository {
    entries: RwLock<Vec<ActivityEntry>>,
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn append(&self, activity: NewActivity) -> Result<ActivityEntry> {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            description: activity.description,
            created_at: Utc::now(),
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<ActivityEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
