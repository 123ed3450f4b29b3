use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Identity;
use crate::features::files::models::FileRecord;
use crate::modules::spreadsheet::Row;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The spreadsheet to upload (xlsx, xls, xlsb, ods or csv)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for file metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Stored name in the upload directory
    pub filename: String,
    /// Filename as uploaded
    pub original_name: String,
    /// Size in bytes
    pub size: i64,
    pub mimetype: String,
    pub owner_id: Uuid,
    /// Column headers of the first sheet, in sheet order
    pub columns: Vec<String>,
    /// Data rows at upload time
    pub row_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponseDto {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            size: record.size,
            mimetype: record.mimetype,
            owner_id: record.owner_id,
            columns: record.columns,
            row_count: record.row_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response DTO for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub file: FileResponseDto,
    pub columns: Vec<String>,
    /// Decoded rows keyed by column header
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Row>,
}

/// Response DTO for decoded file contents
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileDataResponseDto {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Row>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    /// Confirmation that the file was deleted
    pub deleted: bool,
}

/// Query parameters for listing files
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Owner whose files to list (admins only; ignored for other callers)
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl ListFilesQuery {
    /// The owner filter that applies to `caller`.
    ///
    /// Only admins get one; for them a malformed or empty `userId` is rejected.
    pub fn owner_filter(&self, caller: &Identity) -> Result<Option<Uuid>> {
        if !caller.is_admin() {
            return Ok(None);
        }

        self.user_id
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::BadRequest(format!("Invalid userId: {}", raw)))
            })
            .transpose()
    }
}
