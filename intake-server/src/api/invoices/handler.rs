//! Invoice handler
//!
//! Creates a customer, a send-by-email invoice and its line items, then
//! finalizes and sends it. Invoice *status* rows are written later by
//! the webhook consumer, not here.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{OrderType, PhotographDisposition};
use validator::ValidateEmail;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Days the customer has to pay a sent invoice
const INVOICE_DAYS_UNTIL_DUE: u32 = 30;

/// Fee charged when the family asks us to retain the photographs for a
/// year instead of returning them
const PHOTO_RETENTION_FEE_CENTS: i64 = 2500;
const PHOTO_RETENTION_DESCRIPTION: &str = "1-year photograph retention";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub description: String,
    /// Dollar amount; converted to cents at the processor boundary
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub order_id: String,
    pub order_type: OrderType,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub line_items: Vec<LineItemRequest>,
    /// Overrides the order row's stored disposition when present
    pub photograph_disposition: Option<PhotographDisposition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    pub success: bool,
    pub invoice_id: String,
    pub invoice_url: Option<String>,
}

/// Create and send an invoice for an order
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<CreateInvoiceRequest>,
) -> AppResult<Json<CreateInvoiceResponse>> {
    if !req.customer_email.validate_email() {
        return Err(AppError::validation("Invalid customer email address"));
    }
    if req.line_items.is_empty() {
        return Err(AppError::validation("At least one line item is required"));
    }

    let order = state
        .store
        .find_by_id(req.order_type.table(), &req.order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(req.order_id.clone()))?;

    let disposition = req.photograph_disposition.or_else(|| {
        order
            .get("photograph_disposition")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    });

    let customer_id = state
        .payments
        .create_customer(
            req.customer_name.as_deref(),
            &req.customer_email,
            &req.order_id,
        )
        .await?;
    let invoice_id = state
        .payments
        .create_invoice(&customer_id, &req.order_id, INVOICE_DAYS_UNTIL_DUE)
        .await?;

    for item in &req.line_items {
        state
            .payments
            .create_invoice_item(&customer_id, &invoice_id, &item.description, to_cents(item.amount)?)
            .await?;
    }

    if disposition == Some(PhotographDisposition::Retain1Year) {
        state
            .payments
            .create_invoice_item(
                &customer_id,
                &invoice_id,
                PHOTO_RETENTION_DESCRIPTION,
                PHOTO_RETENTION_FEE_CENTS,
            )
            .await?;
    }

    state.payments.finalize_invoice(&invoice_id).await?;
    let sent = state.payments.send_invoice(&invoice_id).await?;
    let invoice_url = sent
        .get("hosted_invoice_url")
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::info!(
        order_id = %req.order_id,
        invoice_id = %invoice_id,
        line_items = req.line_items.len(),
        retention_fee = disposition == Some(PhotographDisposition::Retain1Year),
        "Invoice created and sent"
    );

    Ok(Json(CreateInvoiceResponse {
        success: true,
        invoice_id,
        invoice_url,
    }))
}

fn to_cents(amount: Decimal) -> AppResult<i64> {
    let cents = (amount * Decimal::from(100)).round();
    match cents.to_i64() {
        Some(c) if c > 0 => Ok(c),
        _ => Err(AppError::validation(format!(
            "Invalid line item amount: {}",
            amount
        ))),
    }
}
