//! Common utilities shared across the workspace crates.
//!
//! This crate provides:
//! - Unified error handling with numeric error codes
//! - The `{code, msg, data}` response envelope
//! - Configuration structures and secret handling

pub mod config;
pub mod error;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use response::{ApiResponse, Empty, SUCCESS_CODE, SUCCESS_MSG};
