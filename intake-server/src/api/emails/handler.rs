//! Email handlers

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{EmailType, OrderType};
use validator::ValidateEmail;

use crate::clients::SelectQuery;
use crate::core::ServerState;
use crate::notify::{NotificationService, templates};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub email: String,
    pub subject: String,
    pub message: String,
    pub order_id: String,
    pub order_type: OrderType,
    pub email_type: EmailType,
}

/// Send a staff-composed email for an order and record it in the send
/// history. The referenced order must exist in the table implied by
/// `orderType`.
pub async fn send(
    State(state): State<ServerState>,
    Json(req): Json<SendEmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !req.email.validate_email() {
        return Err(AppError::validation("Invalid recipient email address"));
    }
    validate_required_text(&req.subject, "subject", MAX_NAME_LEN)?;
    validate_required_text(&req.message, "message", MAX_NOTE_LEN)?;

    // 404 before any send: a missing order must not create a history row
    let order = state
        .store
        .find_by_id(req.order_type.table(), &req.order_id)
        .await?;
    if order.is_none() {
        return Err(AppError::order_not_found(req.order_id));
    }

    let body = templates::staff_message(&req.subject, &req.message);
    NotificationService::new(&state)
        .send_and_log(&req.order_id, req.order_type, req.email_type, &req.email, &body)
        .await?;

    Ok(Json(ApiResponse::ok()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub order_id: String,
    pub order_type: OrderType,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub emails: Vec<Value>,
}

/// Send-time-descending email log for an order
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let (emails, _) = state
        .store
        .select(
            "order_emails",
            SelectQuery::new()
                .eq("order_id", &query.order_id)
                .eq("order_type", query.order_type.as_str())
                .order_desc("sent_at"),
        )
        .await?;

    Ok(Json(HistoryResponse {
        success: true,
        emails,
    }))
}
