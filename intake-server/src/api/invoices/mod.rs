//! Invoice creation via the payment processor

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stripe/invoice", post(handler::create))
}
