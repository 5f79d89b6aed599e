//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::{Config, ServerState};
use crate::utils::AppError;
use crate::{admin, api, auth};

/// 请求体上限：表单文档 + 多张照片
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = ServerState::initialize(&self.config);
        let app = build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Intake server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down...");
}

/// Assemble the full application router
///
/// Back-office routes are wrapped by the staff authentication guard;
/// everything under `/api` is the public intake surface.
pub fn build_router(state: ServerState) -> Router {
    let admin_routes = admin::router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::guard::require_staff,
    ));

    Router::new()
        .merge(api::health::router())
        .merge(api::living_form::router())
        .merge(api::memoriam_form::router())
        .merge(api::emails::router())
        .merge(api::invoices::router())
        .merge(api::webhook::router())
        .merge(api::captcha::router())
        .merge(api::staff::router())
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
