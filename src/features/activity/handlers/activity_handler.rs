use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::activity::dtos::ActivityResponseDto;
use crate::features::activity::services::ActivityService;
use crate::features::auth::model::Identity;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's most recent activity (up to 50 entries)
#[utoipa::path(
    get,
    path = "/api/activity",
    responses(
        (status = 200, description = "Recent activity, newest first", body = ApiResponse<Vec<ActivityResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "activity",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_activity(
    identity: Identity,
    State(service): State<Arc<ActivityService>>,
) -> Result<Json<ApiResponse<Vec<ActivityResponseDto>>>> {
    let activities = service.list_recent(&identity).await?;
    let total = activities.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(activities),
        None,
        Some(Meta { total }),
    )))
}
