//! Memoriam order intake and order access

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/memoriam-form",
            post(handler::submit)
                .patch(handler::patch)
                .delete(handler::delete),
        )
        .route("/api/memoriam-order/{id}", get(handler::get_by_id))
}
