use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::Identity;
use crate::features::users::dtos::{
    AuthResponseDto, DeleteUserResponseDto, LoginRequestDto, RegisterRequestDto, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Missing fields or validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn register(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "users"
)]
pub async fn login(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<AuthResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    identity: Identity,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.profile(&identity).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users/all",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access only")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let users = service.list_all().await?;
    Ok(Json(ApiResponse::success(Some(users), None, None)))
}

/// Delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeleteUserResponseDto>),
        (status = 400, description = "Admins cannot delete themselves"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access only"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteUserResponseDto>>> {
    service.delete_user(&admin, id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteUserResponseDto { deleted: true }),
        Some("User deleted".to_string()),
        None,
    )))
}
