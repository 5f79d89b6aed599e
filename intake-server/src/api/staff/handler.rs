//! Staff session handlers
//!
//! Login performs the credential check against the identity provider,
//! then reuses [`classify_session`] to decide the post-login target —
//! the same decision function the request guard runs, so the two sites
//! cannot drift.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::guard::{self, classify_session};
use crate::auth::AalLevel;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub access_token: String,
    /// Where the staff client should navigate next:
    /// mfa-setup, mfa-challenge or home
    pub next: &'static str,
}

/// Staff login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .identity
        .sign_in_with_password(&req.email, &req.password)
        .await
        .inspect_err(|e| {
            security_log!("WARN", "staff_login_failed", email = req.email.clone(), error = format!("{}", e));
        })?;

    let level = current_level(&state, &session.access_token);
    let session_state = classify_session(Some(&session.user), &session.user.factors, level);

    tracing::info!(
        user_id = %session.user.id,
        next = %session_state.post_login_target(),
        "Staff login succeeded"
    );

    Ok(Json(SessionResponse {
        success: true,
        access_token: session.access_token,
        next: session_state.post_login_target(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaChallengeRequest {
    pub factor_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaChallengeResponse {
    pub success: bool,
    pub challenge_id: String,
}

/// Start a TOTP challenge for an enrolled factor
pub async fn mfa_challenge(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<MfaChallengeRequest>,
) -> AppResult<Json<MfaChallengeResponse>> {
    let token = guard::extract_token(&headers).ok_or_else(AppError::not_authenticated)?;
    let challenge_id = state
        .identity
        .create_mfa_challenge(&token, &req.factor_id)
        .await?;

    Ok(Json(MfaChallengeResponse {
        success: true,
        challenge_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaVerifyRequest {
    pub factor_id: String,
    pub challenge_id: String,
    pub code: String,
}

/// Verify a TOTP code; a successful verification upgrades the session
/// to aal2
pub async fn mfa_verify(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<MfaVerifyRequest>,
) -> AppResult<Json<SessionResponse>> {
    let token = guard::extract_token(&headers).ok_or_else(AppError::not_authenticated)?;
    let session = state
        .identity
        .verify_mfa_challenge(&token, &req.factor_id, &req.challenge_id, &req.code)
        .await?;

    let level = current_level(&state, &session.access_token);
    let session_state = classify_session(Some(&session.user), &session.user.factors, level);

    security_log!(
        "INFO",
        "staff_mfa_verified",
        user_id = session.user.id.clone(),
        next = session_state.post_login_target()
    );

    Ok(Json(SessionResponse {
        success: true,
        access_token: session.access_token,
        next: session_state.post_login_target(),
    }))
}

fn current_level(state: &ServerState, access_token: &str) -> Option<AalLevel> {
    state
        .identity
        .decode_claims(access_token)
        .ok()
        .and_then(|claims| claims.aal.as_deref().and_then(AalLevel::from_claim))
}
