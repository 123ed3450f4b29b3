use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for ingested spreadsheet files
#[derive(Debug, Clone, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    /// Server-generated name in the blob store
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: i64,
    pub mimetype: String,
    pub owner_id: Uuid,
    /// Header keys of the first row at ingestion time
    pub columns: Vec<String>,
    pub row_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for persisting a newly ingested file
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: i64,
    pub mimetype: String,
    pub owner_id: Uuid,
    pub columns: Vec<String>,
    pub row_count: i64,
}
