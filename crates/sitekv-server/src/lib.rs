//! `sitekv` HTTP server.
//!
//! Wires the record store and a storage backend into an Axum application.
//! Every request goes through one fallback handler that consults the ordered
//! route table in [`dispatch`]; anything unmatched gets the liveness reply.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the Axum application with all middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let origin = match config.cors_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "invalid CORS origin, allowing any");
                AllowOrigin::from(Any)
            }
        },
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback(dispatch::handle)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(tower::limit::ConcurrencyLimitLayer::new(
            config.max_concurrent_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}
