//! Living form handler

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{Classification, Medium};
use validator::Validate;

use crate::api::intake::{SubmitResponse, read_submission};
use crate::core::ServerState;
use crate::utils::format_phone_number;
use crate::utils::{AppError, AppResult};
use crate::workflow::{LivingSubmission, SubmissionWorkflow};

/// Living wizard form payload (the `payload` multipart part)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LivingFormPayload {
    #[validate(length(min = 1, max = 200))]
    pub first_name: String,
    #[validate(length(min = 1, max = 200))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub street_address: String,
    #[validate(length(min = 1, max = 200))]
    pub city: String,
    #[validate(length(min = 2, max = 2))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    pub classification: Classification,
    pub medium: Medium,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub total_price: Option<Decimal>,
    pub downpayment_price: Option<Decimal>,
    pub captcha_token: Option<String>,
}

impl LivingFormPayload {
    fn into_submission(self) -> LivingSubmission {
        LivingSubmission {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: format_phone_number(&self.phone),
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            classification: self.classification,
            medium: self.medium,
            notes: self.notes,
            total_price: self.total_price,
            downpayment_price: self.downpayment_price,
            captcha_token: self.captcha_token,
        }
    }
}

/// Submit a living order
pub async fn submit(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let (payload, files) = read_submission(&mut multipart).await?;
    let form: LivingFormPayload = serde_json::from_str(&payload)
        .map_err(|e| AppError::validation(format!("Invalid form payload: {}", e)))?;
    form.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = SubmissionWorkflow::new(&state)
        .submit_living(form.into_submission(), files)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}
