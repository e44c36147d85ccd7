pub mod ingest;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

/// The signup route: POST appends, every other method is refused.
pub fn ingest_routes(path: &str) -> Router<SharedState> {
    Router::new().route(
        path,
        post(ingest::ingest).fallback(ingest::method_not_allowed),
    )
}
