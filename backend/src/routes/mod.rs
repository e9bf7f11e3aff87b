//! Route definitions for the Book Catalog API
//!
//! This module organizes all API routes and applies middleware.

use crate::auth::{authenticate, REFRESH_HEADER, REISSUED_TOKEN_HEADER};
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

mod books;
mod health;
mod sessions;
mod users;


pub use books::book_routes;
pub use sessions::session_routes;
pub use users::user_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().api.client_origin);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/v1", api_routes())
        // Every request gets an Identity, anonymous or not
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Book Catalog API v1" }))
        .nest("/users", user_routes())
        .nest("/sessions", session_routes())
        .nest("/books", book_routes())
}

/// CORS for the configured client origin; `*` allows any origin
fn build_cors_layer(client_origin: &str) -> CorsLayer {
    let origin = if client_origin == "*" {
        AllowOrigin::any()
    } else {
        match client_origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(origin = client_origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REFRESH_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REISSUED_TOKEN_HEADER)])
}
