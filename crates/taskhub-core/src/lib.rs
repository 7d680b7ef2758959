//! # Taskhub Core
//!
//! Domain entities, ports, and services for authentication and sessions.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use error::DomainError;
