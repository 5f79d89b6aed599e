//! Payment processor client
//!
//! Customer / invoice / invoice-item creation and invoice sending over
//! the processor's form-encoded API, plus webhook signature
//! verification for the asynchronous status callbacks.

use reqwest::{Client, Response};
use ring::hmac;
use serde_json::Value;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Accepted clock skew between the processor and us, in seconds
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Client for the third-party payment processor
#[derive(Clone)]
pub struct PaymentsClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl PaymentsClient {
    pub fn new(http: Client, base_url: String, secret_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    async fn post_form(&self, path: &str, params: &[(&str, String)]) -> AppResult<Value> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::PaymentFailed,
                    format!("Payment processor unreachable: {}", e),
                )
            })?;
        self.parse(path, resp).await
    }

    async fn parse(&self, path: &str, resp: Response) -> AppResult<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = %status, body = %body,
                "Payment processor call failed");
            return Err(AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Payment processor returned {} for {}", status, path),
            ));
        }
        resp.json().await.map_err(|e| {
            AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Invalid payment processor response: {}", e),
            )
        })
    }

    /// Create a customer, returning its id
    pub async fn create_customer(
        &self,
        name: Option<&str>,
        email: &str,
        order_id: &str,
    ) -> AppResult<String> {
        let mut params = vec![
            ("email", email.to_string()),
            ("metadata[order_id]", order_id.to_string()),
        ];
        if let Some(name) = name {
            params.push(("name", name.to_string()));
        }
        let customer = self.post_form("/v1/customers", &params).await?;
        object_id(&customer, "customer")
    }

    /// Create a draft invoice to be sent by email, returning its id
    pub async fn create_invoice(
        &self,
        customer_id: &str,
        order_id: &str,
        days_until_due: u32,
    ) -> AppResult<String> {
        let invoice = self
            .post_form(
                "/v1/invoices",
                &[
                    ("customer", customer_id.to_string()),
                    ("collection_method", "send_invoice".to_string()),
                    ("days_until_due", days_until_due.to_string()),
                    ("metadata[order_id]", order_id.to_string()),
                ],
            )
            .await?;
        object_id(&invoice, "invoice")
    }

    /// Add a line item to a draft invoice
    pub async fn create_invoice_item(
        &self,
        customer_id: &str,
        invoice_id: &str,
        description: &str,
        amount_cents: i64,
    ) -> AppResult<String> {
        let item = self
            .post_form(
                "/v1/invoiceitems",
                &[
                    ("customer", customer_id.to_string()),
                    ("invoice", invoice_id.to_string()),
                    ("description", description.to_string()),
                    ("amount", amount_cents.to_string()),
                    ("currency", "usd".to_string()),
                ],
            )
            .await?;
        object_id(&item, "invoice item")
    }

    /// Finalize a draft invoice
    pub async fn finalize_invoice(&self, invoice_id: &str) -> AppResult<Value> {
        self.post_form(&format!("/v1/invoices/{}/finalize", invoice_id), &[])
            .await
    }

    /// Email the finalized invoice to the customer; the response carries
    /// the hosted invoice URL
    pub async fn send_invoice(&self, invoice_id: &str) -> AppResult<Value> {
        self.post_form(&format!("/v1/invoices/{}/send", invoice_id), &[])
            .await
    }
}

fn object_id(object: &Value, kind: &str) -> AppResult<String> {
    object
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Payment processor response missing {} id", kind),
            )
        })
}

/// Verify a webhook payload against its `t=...,v1=...` signature header.
///
/// The signed payload is `{timestamp}.{raw body}`, HMAC-SHA256 with the
/// endpoint secret. Any `v1` entry matching within the timestamp
/// tolerance passes.
pub fn verify_webhook_signature(payload: &[u8], sig_header: &str, secret: &str) -> AppResult<()> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in sig_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = Some(v),
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        AppError::with_message(ErrorCode::WebhookSignatureInvalid, "Missing signature timestamp")
    })?;
    if signatures.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::WebhookSignatureInvalid,
            "Missing v1 signature",
        ));
    }

    let ts: i64 = timestamp.parse().map_err(|_| {
        AppError::with_message(ErrorCode::WebhookSignatureInvalid, "Invalid signature timestamp")
    })?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(AppError::with_message(
            ErrorCode::WebhookSignatureInvalid,
            "Signature timestamp outside tolerance",
        ));
    }

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut signed_payload = Vec::with_capacity(timestamp.len() + 1 + payload.len());
    signed_payload.extend_from_slice(timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);
    let expected = hmac::sign(&key, &signed_payload);

    for signature in signatures {
        if let Ok(bytes) = hex::decode(signature)
            && ring::constant_time::verify_slices_are_equal(expected.as_ref(), &bytes).is_ok()
        {
            return Ok(());
        }
    }

    Err(AppError::with_message(
        ErrorCode::WebhookSignatureInvalid,
        "Signature mismatch",
    ))
}
