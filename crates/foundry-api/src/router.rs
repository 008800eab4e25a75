//! Axum router construction for the player API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use foundry_db::SessionRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness check
/// - `POST /api/users` -- register a player
/// - `GET /api/sessions/{user}` -- read a session
/// - `POST /api/sessions/{user}/upgrade` -- upgrade a factory
///
/// CORS allows any origin so browser clients can call the API directly.
pub fn build_router<R: SessionRepository>(state: Arc<AppState<R>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/users", post(handlers::register_user::<R>))
        .route("/api/sessions/{user}", get(handlers::get_session::<R>))
        .route(
            "/api/sessions/{user}/upgrade",
            post(handlers::upgrade::<R>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
