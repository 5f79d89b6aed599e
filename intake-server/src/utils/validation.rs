//! Input validation helpers
//!
//! Centralized text length constants, validation functions and the
//! phone formatter applied to intake submissions.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Person / funeral home names
pub const MAX_NAME_LEN: usize = 200;

/// Notes and free-text messages
pub const MAX_NOTE_LEN: usize = 2000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Street address lines
pub const MAX_ADDRESS_LEN: usize = 500;

/// Uploaded file names
pub const MAX_FILENAME_LEN: usize = 255;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Phone formatting ────────────────────────────────────────────────

/// Format a US phone number as `(555) 123-4567`.
///
/// Idempotent: formatting an already-formatted number yields the same
/// string, because only the digits are considered. Inputs with fewer
/// than 10 digits are returned as their bare digit string.
pub fn format_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
    } else {
        digits
    }
}

/// Sanitize a client-supplied filename for use as a storage object key.
///
/// Strips any path components and replaces characters outside
/// `[A-Za-z0-9._-]`; object keys are always `{order_id}/{filename}`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
