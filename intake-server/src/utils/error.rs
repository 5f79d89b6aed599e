//! Unified error handling
//!
//! Error types live in `shared::error` so internal tooling shares the
//! same codes; this module re-exports them and adds axum-side helpers.

use axum::extract::multipart::MultipartError;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Map a multipart parse failure to a validation error
pub fn from_multipart(e: MultipartError) -> AppError {
    AppError::validation(format!("Invalid multipart request: {}", e))
}
