//! Storage module for uploaded file bytes
//!
//! Provides a flat-directory blob store addressed by generated names.

mod local_blob_store;

pub use local_blob_store::{BlobRemoval, LocalBlobStore, StorageError};
