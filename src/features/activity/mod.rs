//! Activity log: append-only record of uploads and deletions.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/activity` | Bearer | Caller's 50 most recent entries |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{ActivityRepository, PgActivityRepository};
pub use services::ActivityService;
