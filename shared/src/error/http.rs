//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,

            // 400 Bad Request
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::RequiredField
            | ErrorCode::InvalidCredentials
            | ErrorCode::CaptchaFailed
            | ErrorCode::OrderCreateFailed
            | ErrorCode::OrderUpdateFailed
            | ErrorCode::OrderDeleteFailed
            | ErrorCode::NoFieldsToUpdate
            | ErrorCode::WebhookSignatureInvalid
            | ErrorCode::FileTooLarge
            | ErrorCode::UnsupportedFileFormat
            | ErrorCode::InvalidImageFile
            | ErrorCode::NoFilename
            | ErrorCode::EmptyFile => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            ErrorCode::NotAuthenticated
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid
            | ErrorCode::MfaRequired
            | ErrorCode::MfaEnrollmentRequired => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,

            // 404 Not Found
            ErrorCode::NotFound | ErrorCode::OrderNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            ErrorCode::Unknown
            | ErrorCode::IdentityProviderError
            | ErrorCode::CaptchaUnavailable
            | ErrorCode::PaymentFailed
            | ErrorCode::InvoiceCreateFailed
            | ErrorCode::WebhookHandlerFailed
            | ErrorCode::StorageUploadFailed
            | ErrorCode::StorageDeleteFailed
            | ErrorCode::EmailSendFailed
            | ErrorCode::EmailRecordFailed
            | ErrorCode::InternalError
            | ErrorCode::StoreError
            | ErrorCode::UpstreamError
            | ErrorCode::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
