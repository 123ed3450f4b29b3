use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Public user routes (no authentication required)
pub fn public_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/register", post(handlers::register))
        .route("/api/users/login", post(handlers::login))
        .with_state(service)
}

/// Protected user routes (require a bearer token; some are admin-only)
pub fn protected_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/profile", get(handlers::get_profile))
        .route("/api/users/all", get(handlers::list_users))
        .route("/api/users/{id}", delete(handlers::delete_user))
        .with_state(service)
}
