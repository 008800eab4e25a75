//! Error types for the session store.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors and adds the store's own failure modes: unknown users,
//! duplicate registration, writes that touched no row, and records that
//! cannot be decoded into a valid session.

use foundry_game::UserId;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No session is stored for the user.
    #[error("session not found: {0}")]
    NotFound(UserId),

    /// A session already exists for the user.
    #[error("session already exists: {0}")]
    AlreadyExists(UserId),

    /// A write matched no row.
    #[error("{operation} affected no rows for {user}")]
    NoRowsAffected {
        /// The statement that matched nothing.
        operation: &'static str,
        /// The user the write targeted.
        user: String,
    },

    /// A stored record does not describe a valid session.
    #[error("corrupt session record for {user}: {reason}")]
    Decode {
        /// The `user_id` column of the bad record.
        user: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
