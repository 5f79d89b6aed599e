//! Staff authentication guard integration tests
//!
//! The guard redirects rather than erroring, so these tests use a
//! client with redirects disabled and assert on Location headers.

mod common;

use common::*;
use serde_json::{Value, json};

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn admin_without_token_redirects_to_login() {
    let app = spawn_app(|_| {}).await;
    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/staff/login");
}

#[tokio::test]
async fn admin_with_no_factors_redirects_to_mfa_setup() {
    let app = spawn_app(|_| {}).await;
    // Even an aal2 token cannot bypass enrollment
    for aal in ["aal1", "aal2"] {
        let resp = no_redirect_client()
            .get(app.url("/admin/api/living_orders"))
            .bearer_auth(staff_jwt(aal))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 307);
        assert_eq!(location(&resp), "/staff/mfa-setup");
    }
}

#[tokio::test]
async fn admin_with_verified_factor_at_aal1_redirects_to_challenge() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
    })
    .await;

    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .bearer_auth(staff_jwt("aal1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/staff/mfa-challenge");
}

#[tokio::test]
async fn admin_with_aal2_session_is_allowed_through() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
        mock.seed_row(
            "living_orders",
            json!({ "id": "ord_1", "order_type": "Living", "first_name": "Jane" }),
        );
    })
    .await;

    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .bearer_auth(staff_jwt("aal2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], json!(1));
}

#[tokio::test]
async fn cookie_session_is_accepted() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
    })
    .await;

    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .header("Cookie", format!("staff_token={}", staff_jwt("aal2")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn identity_lookup_error_fails_closed_to_login() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
        mock.identity_error = true;
    })
    .await;

    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .bearer_auth(staff_jwt("aal2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/staff/login");
}

#[tokio::test]
async fn garbage_token_redirects_to_login() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
    })
    .await;

    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/staff/login");
}

// ── Login + MFA flow ────────────────────────────────────────────────

#[tokio::test]
async fn login_routes_to_challenge_when_factor_enrolled() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
    })
    .await;

    let resp = app
        .client
        .post(app.url("/api/staff/login"))
        .json(&json!({ "email": "staff@example.com", "password": STAFF_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert_eq!(body["next"], "/staff/mfa-challenge");
}

#[tokio::test]
async fn login_routes_to_setup_when_no_factor_enrolled() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .client
        .post(app.url("/api/staff/login"))
        .json(&json!({ "email": "staff@example.com", "password": STAFF_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["next"], "/staff/mfa-setup");
}

#[tokio::test]
async fn login_with_bad_password_is_rejected() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .client
        .post(app.url("/api/staff/login"))
        .json(&json!({ "email": "staff@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn mfa_challenge_and_verify_upgrade_to_home() {
    let app = spawn_app(|mock| {
        mock.factors = vec![verified_totp_factor()];
    })
    .await;
    let aal1_token = staff_jwt("aal1");

    let resp = app
        .client
        .post(app.url("/api/staff/mfa/challenge"))
        .bearer_auth(&aal1_token)
        .json(&json!({ "factorId": "factor_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let challenge_id = body["challengeId"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/api/staff/mfa/verify"))
        .bearer_auth(&aal1_token)
        .json(&json!({
            "factorId": "factor_1",
            "challengeId": challenge_id,
            "code": "123456",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["next"], "/staff/home");

    // The upgraded token passes the guard
    let resp = no_redirect_client()
        .get(app.url("/admin/api/living_orders"))
        .bearer_auth(body["accessToken"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn mfa_endpoints_require_a_session() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .client
        .post(app.url("/api/staff/mfa/challenge"))
        .json(&json!({ "factorId": "factor_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
