//! Data layer for the Foundry idle game.
//!
//! The [`SessionStore`] is the sole authority for durable player state. It
//! wraps a [`SessionRepository`] (raw row storage) with the concurrency
//! discipline every caller relies on: shared reads, exclusive writes, and
//! exclusive read-modify-write critical sections.
//!
//! # Architecture
//!
//! ```text
//! GameService / TickEngine
//!     |
//!     +-- SessionStore (RwLock discipline, Session <-> SessionRow)
//!         |
//!         +-- PgSessionRepository      (PostgreSQL `sessions` table)
//!         +-- MemorySessionRepository  (in-process, tests and dev)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The locked [`SessionStore`]
//! - [`repository`] -- The [`SessionRepository`] backend trait
//! - [`row`] -- [`SessionRow`], the decomposed column layout
//! - [`session_table`] -- `PostgreSQL` repository
//! - [`memory`] -- In-memory repository
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod row;
pub mod session_table;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemorySessionRepository;
pub use postgres::{PostgresConfig, PostgresPool};
pub use repository::SessionRepository;
pub use row::SessionRow;
pub use session_table::PgSessionRepository;
pub use store::SessionStore;
