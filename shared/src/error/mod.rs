//! Unified error handling
//!
//! Error codes, categories and the application error/response types
//! shared by the intake server and internal tooling.

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
