//! Spreadsheet files: ingestion on upload and owner-or-admin access afterwards.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/files/upload` | Store, decode and record a spreadsheet |
//! | GET | `/api/files` | Caller's files (admins: `?userId=`) |
//! | GET | `/api/files/{id}/data` | Decoded rows |
//! | GET | `/api/files/{id}/download` | Original bytes |
//! | DELETE | `/api/files/{id}` | Remove file and record |
//!
//! Every by-id operation resolves the record first (404), then checks
//! ownership (403), and only then touches the blob store.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{FileRepository, PgFileRepository};
pub use routes::routes;
pub use services::FileService;
