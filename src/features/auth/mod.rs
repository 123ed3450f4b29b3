//! Auth gate: bearer token issuance/verification and role guards.
//!
//! Tokens are verified by `core::middleware::auth_middleware`, which attaches
//! an [`model::Identity`] to the request. Handlers take `Identity` (any
//! authenticated caller) or [`guards::RequireAdmin`] (admins only).

pub mod guards;
pub mod model;
pub mod services;

pub use services::TokenService;
