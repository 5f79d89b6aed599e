//! Shared intake-submission plumbing
//!
//! Both wizards post the same multipart shape: a `payload` JSON part
//! carrying the form data, optional `intake_form` / `consent_form`
//! document parts, and any number of `images` parts.

use axum::extract::Multipart;
use serde::Serialize;
use shared::models::FileUpload;

use crate::utils::error::from_multipart;
use crate::utils::validation::{MAX_FILENAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use crate::workflow::{SubmissionFiles, SubmissionOutcome, SubmittedFile};

/// Multipart part names
const PAYLOAD_FIELD: &str = "payload";
const INTAKE_FORM_FIELD: &str = "intake_form";
const CONSENT_FORM_FIELD: &str = "consent_form";
const IMAGES_FIELD: &str = "images";

/// Response for a completed submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub order_id: String,
    pub file_upload_status: Vec<FileUpload>,
    pub email_sent: bool,
}

impl From<SubmissionOutcome> for SubmitResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            success: true,
            order_id: outcome.order_id,
            file_upload_status: outcome.files,
            email_sent: outcome.email_sent,
        }
    }
}

/// Drain the multipart request into the payload JSON and the selected
/// files
pub async fn read_submission(
    multipart: &mut Multipart,
) -> AppResult<(String, SubmissionFiles)> {
    let mut payload: Option<String> = None;
    let mut files = SubmissionFiles::default();

    while let Some(field) = multipart.next_field().await.map_err(from_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            PAYLOAD_FIELD => {
                payload = Some(field.text().await.map_err(from_multipart)?);
            }
            INTAKE_FORM_FIELD | CONSENT_FORM_FIELD | IMAGES_FIELD => {
                let file = read_file(&name, field).await?;
                match name.as_str() {
                    INTAKE_FORM_FIELD => files.intake_form = Some(file),
                    CONSENT_FORM_FIELD => files.consent_form = Some(file),
                    _ => files.images.push(file),
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::validation("Missing 'payload' field in submission"))?;
    Ok((payload, files))
}

async fn read_file(
    field_name: &str,
    field: axum::extract::multipart::Field<'_>,
) -> AppResult<SubmittedFile> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("No filename for '{}' part", field_name)))?;
    validate_required_text(&file_name, "filename", MAX_FILENAME_LEN)?;

    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

    let bytes = field.bytes().await.map_err(from_multipart)?;
    Ok(SubmittedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}
