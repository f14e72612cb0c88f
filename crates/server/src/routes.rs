use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::cors::{self, OriginPolicy};
use crate::state::AppState;

pub mod lenses;
pub mod system;

/// Build the application router: lens CRUD, welcome/health/metrics, and the
/// boundary layers (trace → CORS → origin gate → body limit).
pub fn build_router(state: AppState, policy: OriginPolicy, max_body_bytes: usize) -> Router {
    let cors_layer = policy.cors_layer();

    Router::new()
        .route("/", get(system::welcome))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics_handler))
        .route("/lenses", get(lenses::list_lenses).post(lenses::create_lens))
        .route(
            "/lenses/:id",
            get(lenses::get_lens).put(lenses::update_lens).delete(lenses::delete_lens),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(policy, cors::enforce_origin))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
