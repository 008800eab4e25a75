//! Shared application state for the player API.

use foundry_core::GameService;

/// State handed to every handler.
///
/// Cheap to share behind an `Arc`; the service itself only holds `Arc`s to
/// the store, rules, and clock.
pub struct AppState<R> {
    /// The game operations.
    pub service: GameService<R>,
}

impl<R> AppState<R> {
    /// Wrap a game service.
    pub const fn new(service: GameService<R>) -> Self {
        Self { service }
    }
}
