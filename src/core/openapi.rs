use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::activity::{dtos as activity_dtos, handlers as activity_handlers};
use crate::features::auth::model::UserRole;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        users_handlers::register,
        users_handlers::login,
        users_handlers::get_profile,
        users_handlers::list_users,
        users_handlers::delete_user,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::get_file_data,
        files_handlers::download_file,
        files_handlers::delete_file,
        // Activity
        activity_handlers::list_activity,
    ),
    components(
        schemas(
            // Common
            Meta,
            UserRole,
            // Users
            users_dtos::RegisterRequestDto,
            users_dtos::LoginRequestDto,
            users_dtos::UserResponseDto,
            users_dtos::AuthResponseDto,
            users_dtos::DeleteUserResponseDto,
            ApiResponse<users_dtos::AuthResponseDto>,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            ApiResponse<users_dtos::DeleteUserResponseDto>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::UploadResponseDto,
            files_dtos::FileDataResponseDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::UploadResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::FileDataResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Activity
            activity_dtos::ActivityResponseDto,
            ApiResponse<Vec<activity_dtos::ActivityResponseDto>>,
        )
    ),
    tags(
        (name = "users", description = "Registration, login and user administration"),
        (name = "files", description = "Spreadsheet upload, decoding and download"),
        (name = "activity", description = "Per-user activity history"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Excel Analytics API",
        version = "0.1.0",
        description = "API documentation for Excel Analytics",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/users/register",
            "/api/users/login",
            "/api/users/profile",
            "/api/users/all",
            "/api/users/{id}",
            "/api/files/upload",
            "/api/files",
            "/api/files/{id}",
            "/api/files/{id}/data",
            "/api/files/{id}/download",
            "/api/activity",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }
}
