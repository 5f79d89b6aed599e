//! Staff authentication guard
//!
//! Per-request gate over the back-office path prefix. The state machine
//! is computed, not stored: each request fetches the session's user and
//! MFA factors from the identity provider, decodes the assurance-level
//! claim, and classifies. Any provider error is treated as
//! unauthenticated (fail-closed).
//!
//! [`classify_session`] is the single decision function; the login
//! handler reuses it to pick the post-login redirect target so the two
//! sites cannot drift.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::clients::{IdentityUser, MfaFactor};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Redirect targets for the partially-authenticated states
pub const LOGIN_PATH: &str = "/staff/login";
pub const MFA_SETUP_PATH: &str = "/staff/mfa-setup";
pub const MFA_CHALLENGE_PATH: &str = "/staff/mfa-challenge";
pub const HOME_PATH: &str = "/staff/home";

/// Authenticator assurance level of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AalLevel {
    Aal1,
    Aal2,
}

impl AalLevel {
    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "aal1" => Some(Self::Aal1),
            "aal2" => Some(Self::Aal2),
            _ => None,
        }
    }
}

/// Session classification, evaluated per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session, or the identity provider could not be consulted
    Unauthenticated,
    /// Session exists but no verified TOTP factor is enrolled
    NoMfaFactor,
    /// Verified factor enrolled, session still at aal1
    MfaPending,
    /// Fully authenticated; the only state allowed through
    Full,
}

impl SessionState {
    /// Where an incomplete session is redirected
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            SessionState::Unauthenticated => Some(LOGIN_PATH),
            SessionState::NoMfaFactor => Some(MFA_SETUP_PATH),
            SessionState::MfaPending => Some(MFA_CHALLENGE_PATH),
            SessionState::Full => None,
        }
    }

    /// Post-login destination surfaced to the staff client
    pub fn post_login_target(&self) -> &'static str {
        self.redirect_target().unwrap_or(HOME_PATH)
    }
}

/// Classify a session from its user, factors and current assurance level.
///
/// A verified TOTP factor makes aal2 the required level; a session still
/// at aal1 must pass the MFA challenge before it counts as full.
pub fn classify_session(
    user: Option<&IdentityUser>,
    factors: &[MfaFactor],
    current_level: Option<AalLevel>,
) -> SessionState {
    if user.is_none() {
        return SessionState::Unauthenticated;
    }

    let has_verified_factor = factors.iter().any(|f| f.is_verified_totp());
    if !has_verified_factor {
        return SessionState::NoMfaFactor;
    }

    match current_level {
        Some(AalLevel::Aal2) => SessionState::Full,
        _ => SessionState::MfaPending,
    }
}

/// 员工认证中间件
///
/// 仅 [`SessionState::Full`] 放行；其余状态重定向到对应页面。
pub async fn require_staff(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_state = evaluate_request(&state, req.headers()).await;

    match session_state {
        SessionState::Full => Ok(next.run(req).await),
        other => {
            let target = other.redirect_target().unwrap_or(LOGIN_PATH);
            security_log!(
                "WARN",
                "staff_guard_redirect",
                state = format!("{:?}", other),
                uri = format!("{:?}", req.uri())
            );
            Ok(Redirect::temporary(target).into_response())
        }
    }
}

/// Evaluate a request's session state, fail-closed on provider errors
async fn evaluate_request(state: &ServerState, headers: &HeaderMap) -> SessionState {
    let Some(token) = extract_token(headers) else {
        return SessionState::Unauthenticated;
    };

    let claims = match state.identity.decode_claims(&token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!("WARN", "staff_token_rejected", error = format!("{}", e));
            return SessionState::Unauthenticated;
        }
    };

    let user = match state.identity.get_user(&token).await {
        Ok(user) => user,
        Err(e) => {
            // Provider errors never fall through to allow
            security_log!("WARN", "staff_lookup_failed", error = format!("{}", e));
            return SessionState::Unauthenticated;
        }
    };

    let level = claims.aal.as_deref().and_then(AalLevel::from_claim);
    let factors = user.factors.clone();
    classify_session(Some(&user), &factors, level)
}

/// Extract the access token from `Authorization: Bearer` or the
/// `staff_token` cookie
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        && let Some(token) = header.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    let cookies = headers.get(http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "staff_token").then(|| value.to_string())
    })
}
