//! Raw persistence behind the session store.
//!
//! A [`SessionRepository`] moves [`SessionRow`] values in and out of durable
//! storage. It enforces no locking of its own; [`SessionStore`] layers the
//! concurrency discipline on top.
//!
//! [`SessionStore`]: crate::store::SessionStore

use std::future::Future;

use foundry_game::UserId;

use crate::error::DbError;
use crate::row::SessionRow;

/// Storage backend for session rows.
pub trait SessionRepository: Send + Sync + 'static {
    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::AlreadyExists`] if a row with the same `user_id`
    /// is already stored.
    fn insert(&self, row: &SessionRow) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fetch the row for a user, if any.
    fn fetch(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<SessionRow>, DbError>> + Send;

    /// Overwrite an existing row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoRowsAffected`] if no row has the row's
    /// `user_id`. Never inserts.
    fn update(&self, row: &SessionRow) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fetch every stored row, in no particular order.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<SessionRow>, DbError>> + Send;
}
