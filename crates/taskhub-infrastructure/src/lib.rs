//! # Taskhub Infrastructure
//!
//! Database and session-store implementations (adapters).

pub mod cache;
pub mod database;

pub use cache::{MemorySessionStore, RedisSessionStore};
pub use database::{create_pool, MemoryUserRepository, PgUserRepository};
