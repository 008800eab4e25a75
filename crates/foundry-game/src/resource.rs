//! Resource kinds and the per-player stockpile (ledger).
//!
//! The game has a fixed, closed set of three resource kinds. Each kind is an
//! independent production and upgrade track. The [`Resources`] ledger holds
//! one non-negative counter per kind; all arithmetic on it is checked or
//! saturating.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A kind of resource produced by a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Iron ore.
    Iron,
    /// Copper ore.
    Copper,
    /// Gold ore.
    Gold,
}

impl ResourceKind {
    /// Every resource kind, in canonical order.
    pub const ALL: [Self; 3] = [Self::Iron, Self::Copper, Self::Gold];

    /// Lowercase name used on the wire and in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iron => "iron",
            Self::Copper => "copper",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known resource kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind: {0:?}")]
pub struct ParseResourceError(pub String);

impl FromStr for ResourceKind {
    type Err = ParseResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseResourceError(s.to_owned()))
    }
}

/// A stockpile of the three resource kinds.
///
/// Also used to express upgrade costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    /// Iron units.
    #[serde(default)]
    pub iron: u64,
    /// Copper units.
    #[serde(default)]
    pub copper: u64,
    /// Gold units.
    #[serde(default)]
    pub gold: u64,
}

impl Resources {
    /// An empty stockpile.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Largest value a counter can reach. Matches the signed 64-bit column
    /// counters are stored in.
    pub const MAX_COUNTER: u64 = 0x7FFF_FFFF_FFFF_FFFF;

    /// Build a stockpile from its three counters.
    pub const fn new(iron: u64, copper: u64, gold: u64) -> Self {
        Self { iron, copper, gold }
    }

    /// Counter for a single resource kind.
    pub const fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Iron => self.iron,
            ResourceKind::Copper => self.copper,
            ResourceKind::Gold => self.gold,
        }
    }

    /// Mutable counter for a single resource kind.
    pub const fn get_mut(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::Iron => &mut self.iron,
            ResourceKind::Copper => &mut self.copper,
            ResourceKind::Gold => &mut self.gold,
        }
    }

    /// Whether every counter is at least the matching counter in `required`.
    pub const fn covers(&self, required: &Self) -> bool {
        self.iron >= required.iron && self.copper >= required.copper && self.gold >= required.gold
    }

    /// Counter-wise addition, clamping at [`Self::MAX_COUNTER`].
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        const fn add(a: u64, b: u64) -> u64 {
            let sum = a.saturating_add(b);
            if sum > Resources::MAX_COUNTER {
                Resources::MAX_COUNTER
            } else {
                sum
            }
        }

        Self {
            iron: add(self.iron, other.iron),
            copper: add(self.copper, other.copper),
            gold: add(self.gold, other.gold),
        }
    }

    /// Counter-wise subtraction. Returns `None` if any counter would go
    /// negative.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Some(Self {
            iron: self.iron.checked_sub(other.iron)?,
            copper: self.copper.checked_sub(other.copper)?,
            gold: self.gold.checked_sub(other.gold)?,
        })
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iron={} copper={} gold={}",
            self.iron, self.copper, self.gold
        )
    }
}
