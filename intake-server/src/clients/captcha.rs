//! CAPTCHA verifier client
//!
//! Forwards the client-supplied token to the third-party verification
//! endpoint. Whether a failed verification blocks submission is the
//! workflow's decision (`Config::strict_mode`), not this client's.

use reqwest::Client;
use serde::Deserialize;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Verification outcome as reported by the verifier
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaOutcome {
    pub success: bool,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// Client for the CAPTCHA verification service
#[derive(Clone)]
pub struct CaptchaVerifier {
    http: Client,
    verify_url: String,
    secret: String,
}

impl CaptchaVerifier {
    pub fn new(http: Client, verify_url: String, secret: String) -> Self {
        Self {
            http,
            verify_url,
            secret,
        }
    }

    /// Verify a token. `Err` means the verifier itself was unreachable;
    /// a reachable verifier that rejects the token yields
    /// `Ok(outcome)` with `success == false`.
    pub async fn verify(&self, token: &str) -> AppResult<CaptchaOutcome> {
        let resp = self
            .http
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::CaptchaUnavailable,
                    format!("CAPTCHA verifier unreachable: {}", e),
                )
            })?;

        if !resp.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::CaptchaUnavailable,
                format!("CAPTCHA verifier returned {}", resp.status()),
            ));
        }

        resp.json().await.map_err(|e| {
            AppError::with_message(
                ErrorCode::CaptchaUnavailable,
                format!("Invalid CAPTCHA verifier response: {}", e),
            )
        })
    }
}
