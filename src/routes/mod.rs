//! Route definitions for the keygate API

mod auth;
mod user;

pub use auth::auth_routes;
pub use user::user_routes;
