use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppPath;
use crate::features::auth::model::Identity;
use crate::features::files::dtos::{
    DeleteFileResponseDto, FileDataResponseDto, FileResponseDto, ListFilesQuery, UploadFileDto,
    UploadResponseDto,
};
use crate::features::files::services::{FileService, UploadedFile};
use crate::shared::types::{ApiResponse, Meta};

/// Upload a spreadsheet
///
/// Accepts multipart/form-data with a single `file` field. The first sheet is
/// decoded and returned alongside the stored metadata.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Spreadsheet upload form",
    ),
    responses(
        (status = 201, description = "File uploaded and decoded", body = ApiResponse<UploadResponseDto>),
        (status = 400, description = "No file, empty file or file too large"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    identity: Identity,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponseDto>>)> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name != "file" {
            // Client-side `columns` / `rowCount` hints are recomputed server-side
            debug!("Ignoring multipart field: {}", field_name);
            continue;
        }

        let mimetype = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some(UploadedFile {
            data: data.to_vec(),
            original_name,
            mimetype,
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let response = service.ingest(&identity, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded".to_string()),
            None,
        )),
    ))
}

/// List files
///
/// Returns the caller's files, newest first. Admins may pass `userId` to list
/// another user's files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files, newest first", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 400, description = "Admin passed a malformed userId"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    identity: Identity,
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let owner_filter = query.owner_filter(&identity)?;
    let files = service.list(&identity, owner_filter).await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Get decoded rows of a file
#[utoipa::path(
    get,
    path = "/api/files/{id}/data",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Decoded rows", body = ApiResponse<FileDataResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to view this file"),
        (status = 404, description = "File not found, or file not found on disk"),
        (status = 500, description = "Stored file could not be parsed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file_data(
    identity: Identity,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<FileDataResponseDto>>> {
    let data = service.get_data(&identity, id).await?;

    Ok(Json(ApiResponse::success(
        Some(FileDataResponseDto { data }),
        None,
        None,
    )))
}

/// Download the original file
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Raw file bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to download this file"),
        (status = 404, description = "File not found, or file not found on disk")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    identity: Identity,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response> {
    let download = service.download(&identity, id).await?;

    let content_type = HeaderValue::from_str(&download.mimetype)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(&download.original_name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

/// Delete a file
///
/// Only the owner or an admin can delete it. The stored bytes are removed on a
/// best-effort basis; the record is deleted either way.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to delete this file"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    identity: Identity,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    let deletion = service.delete(&identity, id).await?;
    debug!(
        "Deleted '{}' (blob: {:?})",
        deletion.record.original_name, deletion.blob
    );

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted".to_string()),
        None,
    )))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(original_name: &str) -> String {
    let fallback: String = original_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(original_name)
    )
}
