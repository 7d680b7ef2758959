//! # Taskhub Security
//!
//! Stateless security primitives: JWT access tokens, password hashing,
//! opaque session secrets, CSRF tokens.

pub mod csrf;
pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::JwtService;
pub use password::PasswordService;
