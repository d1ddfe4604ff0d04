//! Authentication module for keygate
//!
//! Password-based authentication with session-bound credentials.
//! - bcrypt password verification
//! - JWT access/refresh token generation and validation
//! - Session lifecycle orchestration (login, refresh, logout)

pub mod jwt;
pub mod password;
mod service;

pub use jwt::{AccessClaims, JwtError, RefreshClaims};
pub use service::{AuthError, AuthService, TokenPair};
