//! CAPTCHA verification passthrough

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/verify-recaptcha", post(handler::verify))
}
