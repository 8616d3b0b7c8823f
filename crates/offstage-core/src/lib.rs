//! Core domain types for the Offstage backend: media item models,
//! configuration, and the unified error type shared by all crates.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
