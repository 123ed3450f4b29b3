use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Identity;
use crate::features::auth::TokenService;
use crate::features::files::FileService;
use crate::features::users::dtos::{
    AuthResponseDto, LoginRequestDto, RegisterRequestDto, UserResponseDto,
};
use crate::features::users::models::{NewUser, User};
use crate::features::users::repositories::UserRepository;

/// Service for registration, login and user administration
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    files: Arc<FileService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        files: Arc<FileService>,
    ) -> Self {
        Self {
            users,
            tokens,
            files,
        }
    }

    /// Register a new user and issue a token for them
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let email = normalize_email(&dto.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(dto.password).await?;

        // A concurrent registration can still win the race; the store's unique
        // index turns that into Conflict as well.
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name: dto.name.trim().to_string(),
                role: dto.role.unwrap_or_default(),
            })
            .await?;

        info!("User registered: id={}, role={}", user.id, user.role);

        self.auth_response(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let email = normalize_email(&dto.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(dto.password, user.password_hash.clone()).await? {
            return Err(invalid_credentials());
        }

        info!("User logged in: id={}", user.id);

        self.auth_response(user)
    }

    /// The caller's own user record
    pub async fn profile(&self, caller: &Identity) -> Result<UserResponseDto> {
        let user = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Every user (admin only; the route guard enforces the role)
    pub async fn list_all(&self) -> Result<Vec<UserResponseDto>> {
        let users = self.users.list_all().await?;
        Ok(users.into_iter().map(UserResponseDto::from).collect())
    }

    /// Delete a user by id (admin only).
    ///
    /// Their files are purged through the file service first so the blobs go
    /// too. Activity entries outlive the account.
    pub async fn delete_user(&self, admin: &Identity, user_id: Uuid) -> Result<()> {
        if admin.id == user_id {
            return Err(AppError::BadRequest(
                "Admins cannot delete their own account".to_string(),
            ));
        }

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let purged = self.files.purge_owner(user_id).await?;

        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(
            "User deleted: id={}, files={}, by admin={}",
            user_id, purged, admin.id
        );
        Ok(())
    }

    fn auth_response(&self, user: User) -> Result<AuthResponseDto> {
        let issued = self.tokens.issue_token(&user.identity())?;

        Ok(AuthResponseDto {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Hash password using Argon2 on the blocking pool
async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Verify password against a stored PHC hash
async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::features::activity::ActivityRepository;
    use crate::features::files::services::UploadedFile;
    use crate::features::files::FileRepository;
    use crate::shared::test_helpers::{
        sample_workbook, test_file_service, test_token_service, InMemoryActivityRepository,
        InMemoryFileRepository, InMemoryUserRepository,
    };
    use fake::{faker::internet::en::SafeEmail, Fake};
    use tempfile::TempDir;

    struct Fixture {
        service: UserService,
        repo: Arc<InMemoryUserRepository>,
        files: Arc<FileService>,
        file_repo: Arc<InMemoryFileRepository>,
        activities: Arc<InMemoryActivityRepository>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let (files, file_repo, activities) = test_file_service(dir.path());
        let repo = Arc::new(InMemoryUserRepository::default());
        let service = UserService::new(
            repo.clone(),
            Arc::new(test_token_service()),
            Arc::clone(&files),
        );
        Fixture {
            service,
            repo,
            files,
            file_repo,
            activities,
            _dir: dir,
        }
    }

    fn service() -> (UserService, Arc<InMemoryUserRepository>, TempDir) {
        let f = fixture();
        (f.service, f.repo, f._dir)
    }

    fn register_dto(email: &str, role: Option<UserRole>) -> RegisterRequestDto {
        RegisterRequestDto {
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Test User".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_user_role() {
        let (service, _, _dir) = service();
        let email: String = SafeEmail().fake();

        let response = service.register(register_dto(&email, None)).await.unwrap();

        assert_eq!(response.user.role, UserRole::User);
        assert_eq!(response.user.email, email.to_lowercase());
        assert_eq!(response.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_register_token_carries_identity() {
        let (service, _, _dir) = service();
        let tokens = test_token_service();

        let response = service
            .register(register_dto("boss@example.com", Some(UserRole::Admin)))
            .await
            .unwrap();
        let identity = tokens.authenticate(&response.token).unwrap();

        assert_eq!(identity.id, response.user.id);
        assert_eq!(identity.role, UserRole::Admin);
        assert_eq!(identity.name, "Test User");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_and_creates_nothing() {
        let (service, repo, _dir) = service();
        service
            .register(register_dto("dup@example.com", None))
            .await
            .unwrap();

        let err = service
            .register(register_dto("  DUP@example.com ", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plain_text() {
        let (service, repo, _dir) = service();
        let response = service
            .register(register_dto("hash@example.com", None))
            .await
            .unwrap();

        let stored = repo.find_by_id(response.user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "correct horse");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_login_with_valid_and_invalid_credentials() {
        let (service, _, _dir) = service();
        service
            .register(register_dto("login@example.com", None))
            .await
            .unwrap();

        let ok = service
            .login(LoginRequestDto {
                email: "Login@Example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await;
        assert!(ok.is_ok());

        let wrong_password = service
            .login(LoginRequestDto {
                email: "login@example.com".to_string(),
                password: "battery staple".to_string(),
            })
            .await;
        assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

        let unknown = service
            .login(LoginRequestDto {
                email: "nobody@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_profile_and_delete_user() {
        let (service, _, _dir) = service();
        let admin = service
            .register(register_dto("admin@example.com", Some(UserRole::Admin)))
            .await
            .unwrap();
        let user = service
            .register(register_dto("user@example.com", None))
            .await
            .unwrap();
        let admin_identity = test_token_service().authenticate(&admin.token).unwrap();
        let user_identity = test_token_service().authenticate(&user.token).unwrap();

        let profile = service.profile(&user_identity).await.unwrap();
        assert_eq!(profile.email, "user@example.com");

        assert_eq!(service.list_all().await.unwrap().len(), 2);

        assert!(matches!(
            service.delete_user(&admin_identity, admin_identity.id).await,
            Err(AppError::BadRequest(_))
        ));

        service
            .delete_user(&admin_identity, user_identity.id)
            .await
            .unwrap();
        assert!(matches!(
            service.delete_user(&admin_identity, user_identity.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.profile(&user_identity).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_removes_their_blobs_and_keeps_activity() {
        let f = fixture();
        let admin = f
            .service
            .register(register_dto("root@example.com", Some(UserRole::Admin)))
            .await
            .unwrap();
        let user = f
            .service
            .register(register_dto("leaver@example.com", None))
            .await
            .unwrap();
        let admin_identity = test_token_service().authenticate(&admin.token).unwrap();
        let user_identity = test_token_service().authenticate(&user.token).unwrap();

        let uploaded = f
            .files
            .ingest(
                &user_identity,
                UploadedFile {
                    data: sample_workbook(&[&["A"], &["1"]]),
                    original_name: "leaver.xlsx".to_string(),
                    mimetype: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                        .to_string(),
                },
            )
            .await
            .unwrap();
        let path = f
            .file_repo
            .find_by_id(uploaded.file.id)
            .await
            .unwrap()
            .unwrap()
            .path;
        assert!(std::path::Path::new(&path).exists());

        f.service
            .delete_user(&admin_identity, user_identity.id)
            .await
            .unwrap();

        assert!(!std::path::Path::new(&path).exists());
        assert_eq!(f.file_repo.count().await, 0);
        assert_eq!(f.repo.count().await, 1);

        let history = f
            .activities
            .list_recent(user_identity.id, 50)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].description, "Uploaded file: leaver.xlsx");
    }

    #[tokio::test]
    async fn test_delete_unknown_user_touches_no_files() {
        let f = fixture();
        let admin = f
            .service
            .register(register_dto("root@example.com", Some(UserRole::Admin)))
            .await
            .unwrap();
        let admin_identity = test_token_service().authenticate(&admin.token).unwrap();

        let result = f.service.delete_user(&admin_identity, Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(f.repo.count().await, 1);
    }
}
