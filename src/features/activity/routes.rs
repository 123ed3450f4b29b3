use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::activity::handlers;
use crate::features::activity::services::ActivityService;

/// Create routes for the activity feature (protected)
pub fn routes(service: Arc<ActivityService>) -> Router {
    Router::new()
        .route("/api/activity", get(handlers::list_activity))
        .with_state(service)
}
