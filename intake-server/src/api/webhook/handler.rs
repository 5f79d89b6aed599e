//! Webhook handler
//!
//! The `invoices` table is written exclusively here, from the
//! processor's asynchronous events. Upsert on `stripe_invoice_id` keeps
//! redelivery idempotent.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use serde_json::Value;
use shared::models::{Invoice, InvoiceStatus};

use crate::clients::payments::verify_webhook_signature;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Event types that update the `invoices` table; everything else is a
/// no-op acknowledged with 200
const HANDLED_EVENTS: &[&str] = &[
    "invoice.created",
    "invoice.finalized",
    "invoice.paid",
    "invoice.payment_failed",
];

/// Consume a webhook delivery
pub async fn handle(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::WebhookSignatureInvalid,
                "Missing Stripe-Signature header",
            )
        })?;
    verify_webhook_signature(&body, signature, &state.config.webhook_secret)?;

    let event: Value = serde_json::from_slice(&body).map_err(|e| {
        AppError::with_message(
            ErrorCode::WebhookHandlerFailed,
            format!("Unparseable webhook payload: {}", e),
        )
    })?;

    let event_type = event
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if HANDLED_EVENTS.contains(&event_type.as_str()) {
        upsert_invoice(&state, &event_type, &event).await?;
    } else {
        tracing::debug!(event_type = %event_type, "Ignoring webhook event");
    }

    Ok(Json(ApiResponse::ok()))
}

async fn upsert_invoice(state: &ServerState, event_type: &str, event: &Value) -> AppResult<()> {
    let object = &event["data"]["object"];
    let invoice_id = object
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::WebhookHandlerFailed, "Event missing invoice id")
        })?;

    let status = match event_type {
        "invoice.paid" => InvoiceStatus::Paid,
        "invoice.finalized" => InvoiceStatus::Open,
        // The processor keeps a failed invoice open; the back office
        // shows it as unpaid
        "invoice.payment_failed" => InvoiceStatus::Unpaid,
        _ => object
            .get("status")
            .and_then(Value::as_str)
            .and_then(InvoiceStatus::from_processor)
            .unwrap_or(InvoiceStatus::Draft),
    };

    let row = Invoice {
        id: None,
        stripe_invoice_id: invoice_id.to_string(),
        order_id: object["metadata"]["order_id"]
            .as_str()
            .map(str::to_string),
        status,
        amount_due: object["amount_due"].as_i64(),
        hosted_invoice_url: object["hosted_invoice_url"]
            .as_str()
            .map(str::to_string),
        customer_email: object["customer_email"].as_str().map(str::to_string),
        updated_at: Some(Utc::now()),
    };
    let row = serde_json::to_value(&row).map_err(|e| {
        AppError::with_message(
            ErrorCode::WebhookHandlerFailed,
            format!("Failed to serialize invoice row: {}", e),
        )
    })?;

    state
        .store
        .upsert("invoices", "stripe_invoice_id", &row)
        .await
        .map_err(|e| AppError::with_message(ErrorCode::WebhookHandlerFailed, e.message))?;

    tracing::info!(
        invoice_id = %invoice_id,
        event_type = %event_type,
        status = %status,
        "Invoice row updated from webhook"
    );
    Ok(())
}
