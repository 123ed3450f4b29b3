use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    delete_file, download_file, get_file_data, list_files, upload_file,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature (protected)
pub fn routes(file_service: Arc<FileService>) -> Router {
    // Room for multipart overhead; oversized files are rejected by the service
    let body_limit = file_service.max_upload_size() + 1024 * 1024;

    Router::new()
        .route(
            "/api/files/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/files", get(list_files))
        .route("/api/files/{id}", delete(delete_file))
        .route("/api/files/{id}/download", get(download_file))
        .route("/api/files/{id}/data", get(get_file_data))
        .with_state(file_service)
}
