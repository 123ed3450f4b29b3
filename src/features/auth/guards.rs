//! Role-based authorization guards.
//!
//! Two roles exist: `user` and `admin`. Admins pass every ownership check;
//! the guards here cover routes that are admin-only regardless of ownership.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Identity;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Fail with `Forbidden` unless the caller is an admin
pub fn require_admin(identity: &Identity) -> Result<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access only".to_string()))
    }
}

/// Guard for admin-only handlers.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(admin): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        require_admin(identity)?;

        Ok(RequireAdmin(identity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use uuid::Uuid;

    #[test]
    fn test_require_admin() {
        let mut identity = Identity {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            role: UserRole::User,
        };
        assert!(matches!(
            require_admin(&identity),
            Err(AppError::Forbidden(_))
        ));

        identity.role = UserRole::Admin;
        assert!(require_admin(&identity).is_ok());
    }

    async fn admin_only(RequireAdmin(admin): RequireAdmin) -> String {
        admin.email
    }

    #[tokio::test]
    async fn test_require_admin_extractor() {
        use crate::shared::test_helpers::{test_identity, with_identity};
        use axum::{http::StatusCode, routing::get, Router};
        use axum_test::TestServer;

        let router = || Router::new().route("/admin", get(admin_only));

        let user = TestServer::new(with_identity(router(), test_identity(UserRole::User))).unwrap();
        user.get("/admin").await.assert_status(StatusCode::FORBIDDEN);

        let admin_identity = test_identity(UserRole::Admin);
        let admin = TestServer::new(with_identity(router(), admin_identity.clone())).unwrap();
        let response = admin.get("/admin").await;
        response.assert_status_ok();
        response.assert_text(admin_identity.email);

        let anonymous = TestServer::new(router()).unwrap();
        anonymous
            .get("/admin")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
