//! Users feature: registration, login and the credential store.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/users/register` | No | Create account, returns token |
//! | POST | `/api/users/login` | No | Exchange credentials for a token |
//! | GET | `/api/users/profile` | Bearer | Caller's own user record |
//! | GET | `/api/users/all` | Admin | All users |
//! | DELETE | `/api/users/{id}` | Admin | Delete a user |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{PgUserRepository, UserRepository};
pub use services::UserService;
