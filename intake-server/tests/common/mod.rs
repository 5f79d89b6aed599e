//! Shared integration-test harness
//!
//! Boots the real router on an ephemeral port, backed by a single mock
//! upstream server that impersonates the record store, object storage,
//! email sender, CAPTCHA verifier, payment processor and identity
//! provider. Tests flip failure switches on [`MockState`] to exercise
//! the compensating-delete paths.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use intake_server::core::server::build_router;
use intake_server::{Config, ServerState};

/// HS256 secret shared between the mock identity provider and the app
pub const JWT_SECRET: &str = "test-jwt-secret-0123456789abcdef";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const STAFF_PASSWORD: &str = "correct-horse";

/// In-memory world behind every mock upstream
#[derive(Default)]
pub struct MockState {
    /// table name -> rows (each row carries an "id")
    pub tables: HashMap<String, Vec<Value>>,
    /// "bucket/path" -> object size
    pub objects: HashMap<String, usize>,
    /// emails accepted by the sender
    pub emails: Vec<Value>,
    /// (path, form params) for every payment processor call
    pub payment_calls: Vec<(String, HashMap<String, String>)>,
    /// MFA factors returned for the staff user
    pub factors: Vec<Value>,
    pub next_id: u64,

    // Failure switches
    pub fail_storage_uploads: bool,
    pub fail_email: bool,
    pub captcha_success: bool,
    pub identity_error: bool,
}

impl MockState {
    fn with_defaults() -> Self {
        Self {
            captcha_success: true,
            ..Self::default()
        }
    }

    pub fn seed_row(&mut self, table: &str, row: Value) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }
}

type Shared = Arc<Mutex<MockState>>;

/// A running app plus its mock world
pub struct TestApp {
    pub addr: SocketAddr,
    pub mock: Shared,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn table_rows(&self, table: &str) -> Vec<Value> {
        self.mock
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.mock.lock().unwrap().objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn sent_emails(&self) -> Vec<Value> {
        self.mock.lock().unwrap().emails.clone()
    }

    pub fn payment_calls(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.mock
            .lock()
            .unwrap()
            .payment_calls
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

/// Boot with default (non-strict) config
pub async fn spawn_app(customize: impl FnOnce(&mut MockState)) -> TestApp {
    spawn_app_with(false, customize).await
}

/// Boot with an explicit strict_mode
pub async fn spawn_app_with(
    strict_mode: bool,
    customize: impl FnOnce(&mut MockState),
) -> TestApp {
    let mock: Shared = Arc::new(Mutex::new(MockState::with_defaults()));
    customize(&mut mock.lock().unwrap());

    let mock_addr = spawn_mock_upstreams(mock.clone()).await;
    let config = test_config(mock_addr, strict_mode);

    let state = ServerState::initialize(&config);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind app listener");
    let addr = listener.local_addr().expect("Failed to read app addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("App server died");
    });

    TestApp {
        addr,
        mock,
        client: reqwest::Client::new(),
    }
}

fn test_config(mock_addr: SocketAddr, strict_mode: bool) -> Config {
    let base = format!("http://{}", mock_addr);
    Config {
        http_port: 0,
        environment: "test".to_string(),
        strict_mode,
        store_url: base.clone(),
        store_api_key: "test-api-key".to_string(),
        storage_url: base.clone(),
        forms_bucket: "order-forms".to_string(),
        images_bucket: "order-images".to_string(),
        email_api_url: base.clone(),
        email_api_key: "re_test".to_string(),
        email_from: "orders@test.example.com".to_string(),
        payments_api_url: base.clone(),
        payments_secret_key: "sk_test".to_string(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        captcha_verify_url: format!("{}/captcha/verify", base),
        captcha_secret: "captcha-secret".to_string(),
        identity_url: base,
        identity_jwt_secret: JWT_SECRET.to_string(),
        log_dir: None,
    }
}

// ── Test fixtures ───────────────────────────────────────────────────

/// A decodable PNG for image-validated uploads
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(2, 2);
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .expect("Failed to encode fixture image");
    bytes
}

pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\nendobj\ntrailer\n%%EOF\n".to_vec()
}

pub fn image_part(file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(png_bytes())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("Invalid fixture mime")
}

pub fn pdf_part(file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(pdf_bytes())
        .file_name(file_name.to_string())
        .mime_str("application/pdf")
        .expect("Invalid fixture mime")
}

/// Mint a staff access token the way the mock identity provider does
pub fn staff_jwt(aal: &str) -> String {
    mint_jwt(aal)
}

fn mint_jwt(aal: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
        aud: String,
        email: String,
        aal: String,
    }

    let claims = Claims {
        sub: "user_1".to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        aud: "authenticated".to_string(),
        email: "staff@example.com".to_string(),
        aal: aal.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to mint staff token")
}

pub fn verified_totp_factor() -> Value {
    json!({ "id": "factor_1", "factor_type": "totp", "status": "verified" })
}

/// Sign a webhook payload the way the processor does
pub fn webhook_signature(payload: &[u8], secret: &str) -> String {
    use ring::hmac;
    let timestamp = chrono::Utc::now().timestamp();
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);
    let tag = hmac::sign(&key, &signed);
    format!("t={},v1={}", timestamp, hex::encode(tag.as_ref()))
}

// ── Mock upstream server ────────────────────────────────────────────

async fn spawn_mock_upstreams(state: Shared) -> SocketAddr {
    let router = Router::new()
        .route(
            "/rest/v1/{table}",
            post(store_insert)
                .get(store_select)
                .patch(store_patch)
                .delete(store_delete),
        )
        .route("/storage/v1/object/list/{bucket}", post(storage_list))
        .route(
            "/storage/v1/object/{bucket}/{*path}",
            post(storage_upload).delete(storage_delete),
        )
        .route("/emails", post(email_send))
        .route("/captcha/verify", post(captcha_verify))
        .route("/v1/customers", post(payments_customers))
        .route("/v1/invoices", post(payments_invoices))
        .route("/v1/invoiceitems", post(payments_invoice_items))
        .route("/v1/invoices/{id}/finalize", post(payments_finalize))
        .route("/v1/invoices/{id}/send", post(payments_send))
        .route("/auth/v1/token", post(identity_token))
        .route("/auth/v1/user", get(identity_user))
        .route("/auth/v1/factors/{id}/challenge", post(identity_challenge))
        .route("/auth/v1/factors/{id}/verify", post(identity_verify))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Failed to read mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Mock server died");
    });
    addr
}

const RESERVED_PARAMS: &[&str] = &["order", "limit", "offset", "select", "on_conflict"];

fn value_matches(row_value: &Value, filter: &str) -> bool {
    match row_value {
        Value::String(s) => s == filter,
        other => other.to_string() == filter,
    }
}

async fn store_insert(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Vec<Value>> {
    let mut st = state.lock().unwrap();
    let merge = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|p| p.contains("merge-duplicates"))
        .unwrap_or(false);

    if merge && let Some(conflict_col) = query.get("on_conflict") {
        let conflict_value = body.get(conflict_col).cloned().unwrap_or(Value::Null);
        let rows = st.tables.entry(table.clone()).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| r.get(conflict_col) == Some(&conflict_value)) {
            if let (Some(target), Some(patch)) = (existing.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
            }
            return Json(vec![existing.clone()]);
        }
    }

    st.next_id += 1;
    let mut row = body;
    if row.get("id").is_none() {
        row["id"] = json!(format!("row_{}", st.next_id));
    }
    st.tables.entry(table).or_default().push(row.clone());
    Json(vec![row])
}

async fn store_select(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (HeaderMap, Json<Vec<Value>>) {
    let st = state.lock().unwrap();
    let mut rows: Vec<Value> = st
        .tables
        .get(&table)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|row| {
            query.iter().all(|(column, value)| {
                if RESERVED_PARAMS.contains(&column.as_str()) {
                    return true;
                }
                match value.strip_prefix("eq.") {
                    Some(expected) => row
                        .get(column)
                        .map(|v| value_matches(v, expected))
                        .unwrap_or(false),
                    None => true,
                }
            })
        })
        .collect();

    if let Some(order) = query.get("order") {
        let (column, descending) = match order.rsplit_once('.') {
            Some((col, "desc")) => (col.to_string(), true),
            Some((col, "asc")) => (col.to_string(), false),
            _ => (order.clone(), false),
        };
        rows.sort_by_key(|r| r.get(&column).map(|v| v.to_string()).unwrap_or_default());
        if descending {
            rows.reverse();
        }
    }

    let total = rows.len();
    let offset: usize = query
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let limit: usize = query
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();

    let mut headers = HeaderMap::new();
    headers.insert(
        "content-range",
        format!("0-{}/{}", rows.len().saturating_sub(1), total)
            .parse()
            .unwrap(),
    );
    (headers, Json(rows))
}

async fn store_patch(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Vec<Value>> {
    let mut st = state.lock().unwrap();
    let mut updated = Vec::new();
    if let Some(rows) = st.tables.get_mut(&table) {
        for row in rows.iter_mut() {
            let matches = query.iter().all(|(column, value)| {
                match value.strip_prefix("eq.") {
                    Some(expected) => row
                        .get(column)
                        .map(|v| value_matches(v, expected))
                        .unwrap_or(false),
                    None => true,
                }
            });
            if matches
                && let (Some(target), Some(patch)) = (row.as_object_mut(), body.as_object())
            {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
    }
    Json(updated)
}

async fn store_delete(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let mut st = state.lock().unwrap();
    if let Some(rows) = st.tables.get_mut(&table) {
        rows.retain(|row| {
            !query.iter().all(|(column, value)| {
                match value.strip_prefix("eq.") {
                    Some(expected) => row
                        .get(column)
                        .map(|v| value_matches(v, expected))
                        .unwrap_or(false),
                    None => true,
                }
            })
        });
    }
    Json(vec![])
}

async fn storage_upload(
    State(state): State<Shared>,
    Path((bucket, path)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let mut st = state.lock().unwrap();
    if st.fail_storage_uploads {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "upload failed" })),
        )
            .into_response();
    }
    let key = format!("{}/{}", bucket, path);
    st.objects.insert(key.clone(), body.len());
    Json(json!({ "Key": key })).into_response()
}

async fn storage_delete(
    State(state): State<Shared>,
    Path((bucket, path)): Path<(String, String)>,
) -> Json<Value> {
    let mut st = state.lock().unwrap();
    st.objects.remove(&format!("{}/{}", bucket, path));
    Json(json!({ "message": "deleted" }))
}

async fn storage_list(
    State(state): State<Shared>,
    Path(bucket): Path<String>,
    Json(body): Json<Value>,
) -> Json<Vec<Value>> {
    let st = state.lock().unwrap();
    let prefix = body
        .get("prefix")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let full_prefix = format!("{}/{}/", bucket, prefix.trim_end_matches('/'));
    let names: Vec<Value> = st
        .objects
        .keys()
        .filter_map(|key| key.strip_prefix(&full_prefix))
        .map(|name| json!({ "name": name }))
        .collect();
    Json(names)
}

async fn email_send(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut st = state.lock().unwrap();
    if st.fail_email {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "send failed" })),
        )
            .into_response();
    }
    st.emails.push(body);
    let id = format!("em_{}", st.emails.len());
    Json(json!({ "id": id })).into_response()
}

async fn captcha_verify(
    State(state): State<Shared>,
    Form(_params): Form<HashMap<String, String>>,
) -> Json<Value> {
    let st = state.lock().unwrap();
    if st.captcha_success {
        Json(json!({ "success": true }))
    } else {
        Json(json!({ "success": false, "error-codes": ["invalid-input-response"] }))
    }
}

async fn payments_customers(
    State(state): State<Shared>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<Value> {
    let mut st = state.lock().unwrap();
    st.payment_calls.push(("/v1/customers".to_string(), params));
    Json(json!({ "id": "cus_1", "object": "customer" }))
}

async fn payments_invoices(
    State(state): State<Shared>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<Value> {
    let mut st = state.lock().unwrap();
    st.payment_calls.push(("/v1/invoices".to_string(), params));
    let id = format!("in_{}", st.payment_calls.len());
    Json(json!({ "id": id, "object": "invoice", "status": "draft" }))
}

async fn payments_invoice_items(
    State(state): State<Shared>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<Value> {
    let mut st = state.lock().unwrap();
    st.payment_calls
        .push(("/v1/invoiceitems".to_string(), params));
    let id = format!("ii_{}", st.payment_calls.len());
    Json(json!({ "id": id, "object": "invoiceitem" }))
}

async fn payments_finalize(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "object": "invoice", "status": "open" }))
}

async fn payments_send(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "object": "invoice",
        "status": "open",
        "hosted_invoice_url": format!("https://pay.example.test/i/{}", id),
    }))
}

fn identity_user_json(st: &MockState) -> Value {
    json!({
        "id": "user_1",
        "email": "staff@example.com",
        "factors": st.factors,
    })
}

async fn identity_token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let st = state.lock().unwrap();
    if body.get("password").and_then(Value::as_str) == Some(STAFF_PASSWORD) {
        Json(json!({
            "access_token": mint_jwt("aal1"),
            "token_type": "bearer",
            "user": identity_user_json(&st),
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })),
        )
            .into_response()
    }
}

async fn identity_user(State(state): State<Shared>) -> Response {
    let st = state.lock().unwrap();
    if st.identity_error {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "unexpected" })),
        )
            .into_response();
    }
    Json(identity_user_json(&st)).into_response()
}

async fn identity_challenge(Path(_factor): Path<String>) -> Json<Value> {
    Json(json!({ "id": "chal_1", "type": "totp" }))
}

async fn identity_verify(
    State(state): State<Shared>,
    Path(_factor): Path<String>,
    Json(_body): Json<Value>,
) -> Json<Value> {
    let st = state.lock().unwrap();
    Json(json!({
        "access_token": mint_jwt("aal2"),
        "token_type": "bearer",
        "user": identity_user_json(&st),
    }))
}
