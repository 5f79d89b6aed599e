//! Unified error codes for the intake platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: CAPTCHA errors
//! - 4xxx: Order errors
//! - 5xxx: Payment / invoicing errors
//! - 6xxx: File upload / storage errors
//! - 7xxx: Email errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Multi-factor challenge required
    MfaRequired = 1005,
    /// Multi-factor enrollment required
    MfaEnrollmentRequired = 1006,
    /// Identity provider error
    IdentityProviderError = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: CAPTCHA ====================
    /// CAPTCHA verification failed
    CaptchaFailed = 3001,
    /// CAPTCHA verifier unreachable
    CaptchaUnavailable = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order creation failed
    OrderCreateFailed = 4002,
    /// Order update failed
    OrderUpdateFailed = 4003,
    /// Order delete failed
    OrderDeleteFailed = 4004,
    /// No fields supplied for update
    NoFieldsToUpdate = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment processor call failed
    PaymentFailed = 5001,
    /// Invoice creation failed
    InvoiceCreateFailed = 5002,
    /// Webhook signature verification failed
    WebhookSignatureInvalid = 5003,
    /// Webhook handler failed
    WebhookHandlerFailed = 5004,

    // ==================== 6xxx: File Upload ====================
    /// File too large
    FileTooLarge = 6001,
    /// Unsupported file format
    UnsupportedFileFormat = 6002,
    /// Invalid/corrupted image file
    InvalidImageFile = 6003,
    /// No filename provided
    NoFilename = 6004,
    /// Empty file provided
    EmptyFile = 6005,
    /// Object storage upload failed
    StorageUploadFailed = 6006,
    /// Object storage delete failed
    StorageDeleteFailed = 6007,

    // ==================== 7xxx: Email ====================
    /// Email send failed
    EmailSendFailed = 7001,
    /// Email history record failed
    EmailRecordFailed = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Record store error
    StoreError = 9002,
    /// Upstream service error
    UpstreamError = 9003,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::MfaRequired => "Multi-factor challenge required",
            ErrorCode::MfaEnrollmentRequired => "Multi-factor enrollment required",
            ErrorCode::IdentityProviderError => "Identity provider error",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // CAPTCHA
            ErrorCode::CaptchaFailed => "CAPTCHA verification failed",
            ErrorCode::CaptchaUnavailable => "CAPTCHA verifier is unreachable",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderCreateFailed => "Failed to create order",
            ErrorCode::OrderUpdateFailed => "Failed to update order",
            ErrorCode::OrderDeleteFailed => "Failed to delete order",
            ErrorCode::NoFieldsToUpdate => "No fields supplied for update",

            // Payment
            ErrorCode::PaymentFailed => "Payment processor call failed",
            ErrorCode::InvoiceCreateFailed => "Failed to create invoice",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature verification failed",
            ErrorCode::WebhookHandlerFailed => "Webhook handler failed",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::StorageUploadFailed => "Object storage upload failed",
            ErrorCode::StorageDeleteFailed => "Object storage delete failed",

            // Email
            ErrorCode::EmailSendFailed => "Failed to send email",
            ErrorCode::EmailRecordFailed => "Failed to record email history",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StoreError => "Record store error",
            ErrorCode::UpstreamError => "Upstream service error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::MfaRequired),
            1006 => Ok(ErrorCode::MfaEnrollmentRequired),
            1007 => Ok(ErrorCode::IdentityProviderError),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // CAPTCHA
            3001 => Ok(ErrorCode::CaptchaFailed),
            3002 => Ok(ErrorCode::CaptchaUnavailable),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderCreateFailed),
            4003 => Ok(ErrorCode::OrderUpdateFailed),
            4004 => Ok(ErrorCode::OrderDeleteFailed),
            4005 => Ok(ErrorCode::NoFieldsToUpdate),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::InvoiceCreateFailed),
            5003 => Ok(ErrorCode::WebhookSignatureInvalid),
            5004 => Ok(ErrorCode::WebhookHandlerFailed),

            // File Upload
            6001 => Ok(ErrorCode::FileTooLarge),
            6002 => Ok(ErrorCode::UnsupportedFileFormat),
            6003 => Ok(ErrorCode::InvalidImageFile),
            6004 => Ok(ErrorCode::NoFilename),
            6005 => Ok(ErrorCode::EmptyFile),
            6006 => Ok(ErrorCode::StorageUploadFailed),
            6007 => Ok(ErrorCode::StorageDeleteFailed),

            // Email
            7001 => Ok(ErrorCode::EmailSendFailed),
            7002 => Ok(ErrorCode::EmailRecordFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StoreError),
            9003 => Ok(ErrorCode::UpstreamError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
