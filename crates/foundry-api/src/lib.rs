//! Player HTTP API for the Foundry idle game.
//!
//! This crate provides an Axum HTTP server over
//! [`GameService`](foundry_core::GameService):
//!
//! - **`GET /health`** for liveness checks
//! - **`POST /api/users`** to register a player
//! - **`GET /api/sessions/{user}`** to read a player's session
//! - **`POST /api/sessions/{user}/upgrade`** to upgrade one factory
//!
//! Every response body is JSON. Failures carry
//! `{"error": ..., "status": ..., "kind": ...}`; see [`ApiError`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, shutdown_signal, start_server};
pub use state::AppState;
