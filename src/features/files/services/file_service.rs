use axum::body::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::ActivityType;
use crate::features::activity::ActivityService;
use crate::features::auth::model::Identity;
use crate::features::files::dtos::{FileResponseDto, UploadResponseDto};
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::repositories::FileRepository;
use crate::modules::spreadsheet::{self, DecodeError, DecodedSheet, Row, SheetFormat};
use crate::modules::storage::{BlobRemoval, LocalBlobStore};

/// A file received from the client, before ingestion
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub original_name: String,
    pub mimetype: String,
}

/// Result of decoding at upload time.
///
/// An unreadable upload is still stored; it just carries no columns or rows.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(DecodedSheet),
    Unreadable(DecodeError),
}

impl DecodeOutcome {
    fn into_sheet(self, original_name: &str) -> DecodedSheet {
        match self {
            DecodeOutcome::Decoded(sheet) => sheet,
            DecodeOutcome::Unreadable(e) => {
                warn!(
                    "Could not decode '{}', storing without data: {}",
                    original_name, e
                );
                DecodedSheet::default()
            }
        }
    }
}

impl From<std::result::Result<DecodedSheet, DecodeError>> for DecodeOutcome {
    fn from(result: std::result::Result<DecodedSheet, DecodeError>) -> Self {
        match result {
            Ok(sheet) => DecodeOutcome::Decoded(sheet),
            Err(e) => DecodeOutcome::Unreadable(e),
        }
    }
}

/// Raw bytes ready to be served as an attachment
#[derive(Debug)]
pub struct FileDownload {
    pub bytes: Bytes,
    pub original_name: String,
    pub mimetype: String,
}

/// What a delete actually did
#[derive(Debug)]
pub struct FileDeletion {
    pub record: FileRecord,
    pub blob: BlobRemoval,
}

/// Service for spreadsheet ingestion and owner-or-admin file access
pub struct FileService {
    files: Arc<dyn FileRepository>,
    blobs: Arc<LocalBlobStore>,
    activity: Arc<ActivityService>,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        blobs: Arc<LocalBlobStore>,
        activity: Arc<ActivityService>,
        max_upload_size: usize,
    ) -> Self {
        Self {
            files,
            blobs,
            activity,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Store, decode and record an upload owned by `owner`.
    ///
    /// A blob written before a later step fails is left on disk.
    pub async fn ingest(&self, owner: &Identity, upload: UploadedFile) -> Result<UploadResponseDto> {
        if upload.data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if upload.data.len() > self.max_upload_size {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                self.max_upload_size,
                self.max_upload_size / 1024 / 1024
            )));
        }

        let UploadedFile {
            data,
            original_name,
            mimetype,
        } = upload;
        let size = data.len() as i64;

        let filename = LocalBlobStore::generate_filename(&original_name);
        let path = self.blobs.put(&filename, &data).await?;

        let format = SheetFormat::detect(&original_name, &mimetype);
        let outcome = decode_blocking(Bytes::from(data), format).await?;
        let sheet = outcome.into_sheet(&original_name);

        let record = self
            .files
            .create(NewFileRecord {
                filename,
                original_name: original_name.clone(),
                path,
                size,
                mimetype,
                owner_id: owner.id,
                columns: sheet.columns.clone(),
                row_count: sheet.row_count() as i64,
            })
            .await?;

        self.activity
            .record(
                owner.id,
                ActivityType::Upload,
                format!("Uploaded file: {}", original_name),
            )
            .await?;

        info!(
            "File ingested: id={}, owner={}, rows={}",
            record.id, owner.id, record.row_count
        );

        Ok(UploadResponseDto {
            file: record.into(),
            columns: sheet.columns,
            data: sheet.rows,
        })
    }

    /// Newest-first records of the caller, or of `owner_filter` when the caller is an admin
    pub async fn list(
        &self,
        caller: &Identity,
        owner_filter: Option<Uuid>,
    ) -> Result<Vec<FileResponseDto>> {
        let owner_id = match owner_filter {
            Some(target) if caller.is_admin() => target,
            _ => caller.id,
        };

        let records = self.files.list_by_owner(owner_id).await?;
        Ok(records.into_iter().map(FileResponseDto::from).collect())
    }

    /// Decode the stored bytes again and return every row. Reads are not logged.
    pub async fn get_data(&self, caller: &Identity, file_id: Uuid) -> Result<Vec<Row>> {
        let record = self.load_authorized(caller, file_id, "view").await?;
        let bytes = self.blobs.get(&record.path).await?;

        let format = SheetFormat::detect(&record.original_name, &record.mimetype);
        let sheet = match decode_blocking(bytes, format).await? {
            DecodeOutcome::Decoded(sheet) => sheet,
            DecodeOutcome::Unreadable(e) => {
                tracing::error!("Failed to parse stored file {}: {}", record.id, e);
                return Err(AppError::Internal(
                    "Failed to parse spreadsheet".to_string(),
                ));
            }
        };

        Ok(sheet.rows)
    }

    pub async fn download(&self, caller: &Identity, file_id: Uuid) -> Result<FileDownload> {
        let record = self.load_authorized(caller, file_id, "download").await?;
        let bytes = self.blobs.get(&record.path).await?;

        Ok(FileDownload {
            bytes,
            original_name: record.original_name,
            mimetype: record.mimetype,
        })
    }

    /// Remove the blob (best effort) and then the record.
    ///
    /// Disk failures are logged and never stop the record from being deleted.
    pub async fn delete(&self, caller: &Identity, file_id: Uuid) -> Result<FileDeletion> {
        let record = self.load_authorized(caller, file_id, "delete").await?;

        let blob = self.blobs.remove(&record.path).await;
        match &blob {
            BlobRemoval::Removed => debug!("Blob removed for file {}", record.id),
            BlobRemoval::AlreadyMissing => {
                warn!("Blob for file {} was already missing", record.id)
            }
            BlobRemoval::Failed(reason) => {
                warn!("Failed to remove blob for file {}: {}", record.id, reason)
            }
        }

        if !self.files.delete(record.id).await? {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        self.activity
            .record(
                caller.id,
                ActivityType::Delete,
                format!("Deleted file: {}", record.original_name),
            )
            .await?;

        info!("File deleted: id={}, by={}", record.id, caller.id);
        Ok(FileDeletion { record, blob })
    }

    /// Remove every file owned by `owner_id`, blobs first (best effort), then records.
    ///
    /// Used before the owner account itself is deleted. Returns how many records went.
    pub async fn purge_owner(&self, owner_id: Uuid) -> Result<usize> {
        let records = self.files.list_by_owner(owner_id).await?;
        let mut purged = 0;

        for record in records {
            if let BlobRemoval::Failed(reason) = self.blobs.remove(&record.path).await {
                warn!("Failed to remove blob for file {}: {}", record.id, reason);
            }
            if self.files.delete(record.id).await? {
                purged += 1;
            }
        }

        info!("Purged {} files of owner {}", purged, owner_id);
        Ok(purged)
    }

    /// Existence first, then ownership; nothing touches the blob store before both pass
    async fn load_authorized(
        &self,
        caller: &Identity,
        file_id: Uuid,
        action: &str,
    ) -> Result<FileRecord> {
        let record = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if !caller.can_access(record.owner_id) {
            return Err(AppError::Forbidden(format!(
                "Not authorized to {} this file",
                action
            )));
        }

        Ok(record)
    }
}

async fn decode_blocking(bytes: Bytes, format: SheetFormat) -> Result<DecodeOutcome> {
    tokio::task::spawn_blocking(move || DecodeOutcome::from(spreadsheet::decode(&bytes, format)))
        .await
        .map_err(|e| AppError::Internal(format!("Decode task failed: {}", e)))
}
