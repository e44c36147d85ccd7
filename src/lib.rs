pub mod config;
pub mod error;
pub mod state;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::ledger::ContentStore;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config, store: Arc<dyn ContentStore>) -> Router {
    let body_limit = config.max_body_size;
    let route = config.route.clone();

    let state: SharedState = Arc::new(AppState { config, store });

    Router::new()
        .merge(routes::ingest_routes(&route))
        .route(config::HEALTH_ROUTE, axum::routing::get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
