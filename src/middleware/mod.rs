//! Middleware for the keygate API

pub mod auth;

pub use auth::AuthenticatedUser;
