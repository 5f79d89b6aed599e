//! Memoriam form handlers

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::models::{Classification, Medium, OrderType};
use validator::Validate;

use crate::api::intake::{SubmitResponse, read_submission};
use crate::core::ServerState;
use crate::utils::format_phone_number;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use crate::workflow::{MemoriamSubmission, SubmissionWorkflow, cascade_delete_order};

/// Columns staff and the wizard may patch on a memoriam order
const UPDATABLE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "street_address",
    "city",
    "state",
    "postal_code",
    "funeral_home_name",
    "funeral_home_contact",
    "funeral_home_phone",
    "funeral_home_email",
    "classification",
    "medium",
    "notes",
    "total_price",
    "intake_form_path",
    "consent_form_path",
    "photograph_disposition",
    "is_completed",
];

/// Memoriam wizard form payload (the `payload` multipart part)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemoriamFormPayload {
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
    #[validate(length(min = 1, max = 200))]
    pub funeral_home_name: String,
    #[validate(length(max = 200))]
    pub funeral_home_contact: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub funeral_home_phone: String,
    #[validate(email)]
    pub funeral_home_email: Option<String>,
    pub classification: Classification,
    pub medium: Medium,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub total_price: Option<Decimal>,
    pub captcha_token: Option<String>,
}

impl MemoriamFormPayload {
    fn into_submission(self) -> MemoriamSubmission {
        MemoriamSubmission {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: format_phone_number(&self.phone),
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            funeral_home_name: self.funeral_home_name,
            funeral_home_contact: self.funeral_home_contact,
            funeral_home_phone: format_phone_number(&self.funeral_home_phone),
            funeral_home_email: self.funeral_home_email,
            classification: self.classification,
            medium: self.medium,
            notes: self.notes,
            total_price: self.total_price,
            captcha_token: self.captcha_token,
        }
    }
}

/// Submit a memoriam order
pub async fn submit(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let (payload, files) = read_submission(&mut multipart).await?;
    let form: MemoriamFormPayload = serde_json::from_str(&payload)
        .map_err(|e| AppError::validation(format!("Invalid form payload: {}", e)))?;
    form.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = SubmissionWorkflow::new(&state)
        .submit_memoriam(form.into_submission(), files)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    pub order_id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Patch a memoriam order as the wizard progresses or staff edit it.
/// Last write wins; there is no concurrency token.
pub async fn patch(
    State(state): State<ServerState>,
    Json(req): Json<PatchRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let patch: serde_json::Map<String, Value> = req
        .fields
        .into_iter()
        .filter(|(key, _)| UPDATABLE_COLUMNS.contains(&key.as_str()))
        .collect();

    if patch.is_empty() {
        return Err(AppError::new(ErrorCode::NoFieldsToUpdate));
    }

    let updated = state
        .store
        .update(OrderType::Memoriam.table(), &req.order_id, &Value::Object(patch))
        .await
        .map_err(|e| AppError::with_message(ErrorCode::OrderUpdateFailed, e.message))?;

    if updated.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderUpdateFailed,
            format!("Order {} was not updated", req.order_id),
        ));
    }

    Ok(Json(ApiResponse::ok()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub order_id: String,
}

/// Delete a memoriam order. Used both as the wizard's compensating
/// delete endpoint and by staff; cascades to storage objects and
/// dependent rows.
pub async fn delete(
    State(state): State<ServerState>,
    Json(req): Json<DeleteRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    cascade_delete_order(&state, OrderType::Memoriam, &req.order_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Fetch a memoriam order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let order = state
        .store
        .find_by_id(OrderType::Memoriam.table(), &id)
        .await?
        .ok_or_else(|| AppError::order_not_found(&id))?;
    Ok(Json(json!({ "order": order })))
}
