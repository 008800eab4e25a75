//! REST endpoint handlers for the player API.
//!
//! Handlers translate HTTP into [`GameService`](foundry_core::GameService)
//! calls and back. They hold no game logic of their own.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness check |
//! | `POST` | `/api/users` | Register a player |
//! | `GET` | `/api/sessions/{user}` | Read a player's session |
//! | `POST` | `/api/sessions/{user}/upgrade` | Upgrade one factory |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use foundry_db::SessionRepository;
use foundry_game::Session;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/users`.
#[derive(Debug, serde::Deserialize)]
pub struct RegisterRequest {
    /// The new player's name.
    pub name: String,
}

/// Request body for `POST /api/sessions/{user}/upgrade`.
#[derive(Debug, serde::Deserialize)]
pub struct UpgradeRequest {
    /// `iron`, `copper`, or `gold`.
    pub resource: String,
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/users` -- create a session. Responds `201 Created`.
pub async fn register_user<R: SessionRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let Json(body) = payload?;
    let session = state.service.register_user(&body.name).await?;
    tracing::info!(user = %session.user, "Player registered");
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/sessions/{user}`
pub async fn get_session<R: SessionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.service.get_session(&user).await?))
}

/// `POST /api/sessions/{user}/upgrade`
pub async fn upgrade<R: SessionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user): Path<String>,
    payload: Result<Json<UpgradeRequest>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(body) = payload?;
    let session = state.service.upgrade_by_name(&user, &body.resource).await?;
    Ok(Json(session))
}
