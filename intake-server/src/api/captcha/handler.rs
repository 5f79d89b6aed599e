//! CAPTCHA handler

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Forward a client token to the third-party verifier
pub async fn verify(
    State(state): State<ServerState>,
    Json(req): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let outcome = state.captcha.verify(&req.token).await?;
    if !outcome.success {
        return Err(AppError::with_message(
            ErrorCode::CaptchaFailed,
            format!(
                "CAPTCHA verification failed: {}",
                outcome.error_codes.join(", ")
            ),
        ));
    }
    Ok(Json(ApiResponse::ok()))
}
