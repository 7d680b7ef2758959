//! # Taskhub Shared
//!
//! Configuration, telemetry, and app-wide constants.

pub mod config;
pub mod constants;
pub mod telemetry;
pub mod utils;
