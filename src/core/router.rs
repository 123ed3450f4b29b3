use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::middleware;
use crate::features::activity::{routes as activity_routes, ActivityService};
use crate::features::auth::TokenService;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::users::{routes as users_routes, UserService};

/// Shared services handed to the router
#[derive(Clone)]
pub struct AppServices {
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserService>,
    pub files: Arc<FileService>,
    pub activity: Arc<ActivityService>,
}

/// API routes without swagger or the outer tower-http layers
pub fn api_router(services: AppServices) -> Router {
    // Protected routes (require a valid bearer token)
    let protected_routes = Router::new()
        .merge(users_routes::protected_routes(Arc::clone(&services.users)))
        .merge(files_routes::routes(Arc::clone(&services.files)))
        .merge(activity_routes::routes(Arc::clone(&services.activity)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(users_routes::public_routes(services.users))
        .route("/", get(welcome))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Excel Analytics API" }))
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}
