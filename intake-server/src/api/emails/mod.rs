//! Staff email sending and send history

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/send-email", post(handler::send))
        .route("/api/email-history", get(handler::history))
}
