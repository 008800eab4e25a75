//! Error types for the foundry-game crate.
//!
//! Upgrade failures are business-rule violations, surfaced verbatim to the
//! player. A failed upgrade never changes the factory or the session.

use crate::resource::{ResourceKind, Resources};

/// Why a factory upgrade was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// The stockpile is below the cost of the current level on some counter.
    #[error("not enough resources to upgrade {resource} from level {level}: need {required}, have {available}")]
    InsufficientResources {
        /// The factory being upgraded.
        resource: ResourceKind,
        /// The factory's current level.
        level: u32,
        /// The cost for the current level.
        required: Resources,
        /// The stockpile at the time of the attempt.
        available: Resources,
    },

    /// The factory was upgraded too recently.
    #[error("{resource} factory is cooling down: {remaining_secs}s remaining")]
    CooldownActive {
        /// The factory being upgraded.
        resource: ResourceKind,
        /// Seconds until the upgrade becomes available.
        remaining_secs: u64,
    },

    /// No upgrade is defined out of the current level.
    #[error("{resource} factory cannot be upgraded from level {level}")]
    UnknownLevel {
        /// The factory being upgraded.
        resource: ResourceKind,
        /// The factory's current level.
        level: u32,
    },
}

impl UpgradeError {
    /// Short machine-readable kind, used in API error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientResources { .. } => "insufficient_resources",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::UnknownLevel { .. } => "unknown_level",
        }
    }
}
