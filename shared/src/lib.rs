//! Shared types for the intake platform
//!
//! Common types used by the intake server and internal tooling:
//! domain models, error types and response structures.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    Classification, EmailType, FileUpload, FileUploadStatus, Invoice, InvoiceStatus, LivingOrder,
    Medium, MemoriamOrder, OrderEmail, OrderImage, OrderType, PhotographDisposition,
};
