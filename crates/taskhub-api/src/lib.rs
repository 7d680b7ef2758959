//! # Taskhub API
//!
//! HTTP handlers, the request gate, cookie transport, and DTOs.

pub mod cookies;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
