//! API handlers for the keygate backend

pub mod auth;
pub mod user;

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
