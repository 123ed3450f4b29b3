pub mod file_service;

pub use file_service::{FileService, UploadedFile};
