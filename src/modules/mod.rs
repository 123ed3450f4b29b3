//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the blob store for uploaded bytes and the tabular decoder that
//! turns spreadsheet bytes into header-keyed rows.

pub mod spreadsheet;
pub mod storage;
