//! Email, invoicing and webhook integration tests

mod common;

use common::*;
use serde_json::{Value, json};

fn seed_memoriam_order(mock: &mut MockState, id: &str, disposition: Option<&str>) {
    let mut row = json!({
        "id": id,
        "order_type": "Memoriam",
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jane@example.com",
    });
    if let Some(disposition) = disposition {
        row["photograph_disposition"] = json!(disposition);
    }
    mock.seed_row("memoriam_orders", row);
}

// ── Send email ──────────────────────────────────────────────────────

#[tokio::test]
async fn send_email_for_missing_order_is_404_and_writes_no_row() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .client
        .post(app.url("/api/send-email"))
        .json(&json!({
            "email": "jane@example.com",
            "subject": "About your order",
            "message": "We have an update.",
            "orderId": "missing",
            "orderType": "memoriam",
            "emailType": "custom",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert!(app.table_rows("order_emails").is_empty());
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn send_email_sends_and_records_history_row() {
    let app = spawn_app(|mock| seed_memoriam_order(mock, "ord_9", None)).await;

    let resp = app
        .client
        .post(app.url("/api/send-email"))
        .json(&json!({
            "email": "jane@example.com",
            "subject": "About your order",
            "message": "We have an update.",
            "orderId": "ord_9",
            "orderType": "memoriam",
            "emailType": "custom",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));

    assert_eq!(app.sent_emails().len(), 1);
    let rows = app.table_rows("order_emails");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order_id"], "ord_9");
    assert_eq!(rows[0]["order_type"], "memoriam");
    assert_eq!(rows[0]["email_type"], "custom");
    assert_eq!(rows[0]["recipient_email"], "jane@example.com");
}

#[tokio::test]
async fn send_email_failure_is_500_and_writes_no_row() {
    let app = spawn_app(|mock| {
        seed_memoriam_order(mock, "ord_9", None);
        mock.fail_email = true;
    })
    .await;

    let resp = app
        .client
        .post(app.url("/api/send-email"))
        .json(&json!({
            "email": "jane@example.com",
            "subject": "About your order",
            "message": "We have an update.",
            "orderId": "ord_9",
            "orderType": "memoriam",
            "emailType": "custom",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert!(app.table_rows("order_emails").is_empty());
}

#[tokio::test]
async fn email_history_is_descending_by_send_time() {
    let app = spawn_app(|mock| {
        seed_memoriam_order(mock, "ord_9", None);
        mock.seed_row(
            "order_emails",
            json!({
                "id": "em_old",
                "order_id": "ord_9",
                "order_type": "memoriam",
                "email_type": "confirmation",
                "recipient_email": "jane@example.com",
                "sent_at": "2026-01-01T00:00:00Z",
            }),
        );
        mock.seed_row(
            "order_emails",
            json!({
                "id": "em_new",
                "order_id": "ord_9",
                "order_type": "memoriam",
                "email_type": "custom",
                "recipient_email": "jane@example.com",
                "sent_at": "2026-02-01T00:00:00Z",
            }),
        );
        // A different order's mail must not leak in
        mock.seed_row(
            "order_emails",
            json!({
                "id": "em_other",
                "order_id": "ord_10",
                "order_type": "memoriam",
                "email_type": "custom",
                "recipient_email": "other@example.com",
                "sent_at": "2026-03-01T00:00:00Z",
            }),
        );
    })
    .await;

    let resp = app
        .client
        .get(app.url("/api/email-history?orderId=ord_9&orderType=memoriam"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    let emails = body["emails"].as_array().unwrap();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0]["id"], "em_new");
    assert_eq!(emails[1]["id"], "em_old");
}

// ── Invoicing ───────────────────────────────────────────────────────

#[tokio::test]
async fn invoice_creation_adds_retention_fee_line_item() {
    let app = spawn_app(|mock| {
        seed_memoriam_order(mock, "ord_9", Some("RETAIN_1_YEAR"));
    })
    .await;

    let resp = app
        .client
        .post(app.url("/api/stripe/invoice"))
        .json(&json!({
            "orderId": "ord_9",
            "orderType": "memoriam",
            "customerName": "Jane Doe",
            "customerEmail": "jane@example.com",
            "lineItems": [
                { "description": "Memorial artwork", "amount": 425.0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    let invoice_id = body["invoiceId"].as_str().unwrap();
    assert!(body["invoiceUrl"]
        .as_str()
        .unwrap()
        .contains(invoice_id));

    let customers = app.payment_calls("/v1/customers");
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].get("email").map(String::as_str), Some("jane@example.com"));
    assert_eq!(
        customers[0].get("metadata[order_id]").map(String::as_str),
        Some("ord_9")
    );

    let invoices = app.payment_calls("/v1/invoices");
    assert_eq!(invoices.len(), 1);
    assert_eq!(
        invoices[0].get("collection_method").map(String::as_str),
        Some("send_invoice")
    );

    // Artwork line plus the $25 retention fee
    let items = app.payment_calls("/v1/invoiceitems");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("amount").map(String::as_str), Some("42500"));
    assert_eq!(items[1].get("amount").map(String::as_str), Some("2500"));
    assert_eq!(
        items[1].get("description").map(String::as_str),
        Some("1-year photograph retention")
    );
}

#[tokio::test]
async fn invoice_creation_without_retention_has_single_item() {
    let app = spawn_app(|mock| seed_memoriam_order(mock, "ord_9", None)).await;

    let resp = app
        .client
        .post(app.url("/api/stripe/invoice"))
        .json(&json!({
            "orderId": "ord_9",
            "orderType": "memoriam",
            "customerEmail": "jane@example.com",
            "lineItems": [
                { "description": "Memorial artwork", "amount": 600.0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let items = app.payment_calls("/v1/invoiceitems");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("amount").map(String::as_str), Some("60000"));
}

// ── Webhook ─────────────────────────────────────────────────────────

fn invoice_event(event_type: &str, invoice_id: &str) -> Vec<u8> {
    json!({
        "id": "evt_1",
        "type": event_type,
        "data": { "object": {
            "id": invoice_id,
            "object": "invoice",
            "status": "paid",
            "amount_due": 42500,
            "hosted_invoice_url": format!("https://pay.example.test/i/{}", invoice_id),
            "customer_email": "jane@example.com",
            "metadata": { "order_id": "ord_9" },
        }},
    })
    .to_string()
    .into_bytes()
}

async fn post_webhook(app: &TestApp, payload: Vec<u8>, secret: &str) -> reqwest::Response {
    let signature = webhook_signature(&payload, secret);
    app.client
        .post(app.url("/api/webhook"))
        .header("Stripe-Signature", signature)
        .header("Content-Type", "application/json")
        .body(payload)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn webhook_paid_replay_is_idempotent() {
    let app = spawn_app(|_| {}).await;
    let payload = invoice_event("invoice.paid", "in_123");

    let first = post_webhook(&app, payload.clone(), WEBHOOK_SECRET).await;
    assert_eq!(first.status(), 200);
    let second = post_webhook(&app, payload, WEBHOOK_SECRET).await;
    assert_eq!(second.status(), 200);

    // Upsert on stripe_invoice_id: exactly one row, status paid
    let rows = app.table_rows("invoices");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stripe_invoice_id"], "in_123");
    assert_eq!(rows[0]["status"], "paid");
    assert_eq!(rows[0]["order_id"], "ord_9");
}

#[tokio::test]
async fn webhook_status_progression_updates_single_row() {
    let app = spawn_app(|_| {}).await;

    let resp = post_webhook(&app, invoice_event("invoice.finalized", "in_123"), WEBHOOK_SECRET).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(app.table_rows("invoices")[0]["status"], "open");

    let resp = post_webhook(&app, invoice_event("invoice.paid", "in_123"), WEBHOOK_SECRET).await;
    assert_eq!(resp.status(), 200);

    let rows = app.table_rows("invoices");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "paid");
}

#[tokio::test]
async fn webhook_bad_signature_is_400_and_writes_nothing() {
    let app = spawn_app(|_| {}).await;
    let payload = invoice_event("invoice.paid", "in_123");

    let resp = post_webhook(&app, payload, "whsec_wrong").await;
    assert_eq!(resp.status(), 400);
    assert!(app.table_rows("invoices").is_empty());
}

#[tokio::test]
async fn webhook_unknown_event_is_acknowledged_noop() {
    let app = spawn_app(|_| {}).await;
    let payload = json!({
        "id": "evt_2",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } },
    })
    .to_string()
    .into_bytes();

    let resp = post_webhook(&app, payload, WEBHOOK_SECRET).await;
    assert_eq!(resp.status(), 200);
    assert!(app.table_rows("invoices").is_empty());
}
