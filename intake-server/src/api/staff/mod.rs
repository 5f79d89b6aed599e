//! Staff session endpoints

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/staff/login", post(handler::login))
        .route("/api/staff/mfa/challenge", post(handler::mfa_challenge))
        .route("/api/staff/mfa/verify", post(handler::mfa_verify))
}
