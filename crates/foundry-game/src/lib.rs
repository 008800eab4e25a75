//! Domain model for the Foundry idle-production game.
//!
//! Players own a [`Session`]: a stockpile of three resources and one
//! [`Factory`] per resource. Factories produce continuously at a rate set by
//! their level; the stockpile grows with elapsed wall-clock time. Upgrading
//! a factory is gated by a resource cost and a cooldown.
//!
//! Everything in this crate is pure computation over values. Persistence
//! and scheduling live in `foundry-db` and `foundry-core`.
//!
//! # Modules
//!
//! - [`resource`] -- Resource kinds and the [`Resources`] ledger
//! - [`user`] -- The trusted [`UserId`]
//! - [`rules`] -- Production and upgrade tables
//! - [`factory`] -- The upgrade state machine
//! - [`session`] -- Sessions and time-based accrual
//! - [`clock`] -- [`Clock`] abstraction with system and manual clocks
//! - [`error`] -- [`UpgradeError`]

pub mod clock;
pub mod error;
pub mod factory;
pub mod resource;
pub mod rules;
pub mod session;
pub mod user;

// Re-export primary types for convenience.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::UpgradeError;
pub use factory::Factory;
pub use resource::{ParseResourceError, ResourceKind, Resources};
pub use rules::{Rules, RulesError, TrackRules, UpgradeRequirement};
pub use session::{Accrual, Factories, Session};
pub use user::{UserId, UserIdError};
