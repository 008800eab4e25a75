//! Production and upgrade tables.
//!
//! [`Rules`] is immutable configuration keyed by (resource kind, level). It
//! is built once at startup (defaults or a configuration override), checked
//! with [`Rules::validate`], and handed to every component that needs it
//! behind an `Arc`.
//!
//! Production rates are defined for levels 1 through 5. Upgrade cost and
//! cooldown are defined for levels 1 through 4, so a level-5 factory has no
//! upgrade entry and upgrading it fails with `UnknownLevel`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceKind, Resources};

/// Errors found when validating a rule set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// No track is configured for a resource kind.
    #[error("no rules configured for {0}")]
    MissingTrack(ResourceKind),

    /// A level reachable by play has no production rate.
    #[error("{resource} level {level} has no production rate")]
    MissingProductionRate {
        /// The resource track.
        resource: ResourceKind,
        /// The level without a rate.
        level: u32,
    },

    /// A level-0 entry was configured. Levels start at 1.
    #[error("{resource} rules contain level 0")]
    LevelZero {
        /// The resource track.
        resource: ResourceKind,
    },
}

/// Cost and cooldown gating an upgrade out of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRequirement {
    /// Stockpile each counter must reach.
    pub cost: Resources,
    /// Minimum seconds since the factory's last upgrade.
    pub cooldown_secs: u64,
}

/// Rules for a single resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackRules {
    /// Units produced per second, by factory level.
    pub production: BTreeMap<u32, u64>,
    /// Requirement to upgrade out of a level, by factory level.
    pub upgrades: BTreeMap<u32, UpgradeRequirement>,
}

/// The full rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Per-kind tables.
    pub tracks: BTreeMap<ResourceKind, TrackRules>,
    /// Whether a successful upgrade deducts its cost from the stockpile.
    #[serde(default)]
    pub charge_upgrade_cost: bool,
}

impl Rules {
    /// Units per second produced by a factory of `kind` at `level`.
    pub fn production_rate(&self, kind: ResourceKind, level: u32) -> Option<u64> {
        self.tracks.get(&kind)?.production.get(&level).copied()
    }

    /// Requirement to upgrade a factory of `kind` out of `level`.
    pub fn upgrade_requirement(&self, kind: ResourceKind, level: u32) -> Option<UpgradeRequirement> {
        self.tracks.get(&kind)?.upgrades.get(&level).copied()
    }

    /// Highest level any factory of `kind` can reach.
    pub fn max_level(&self, kind: ResourceKind) -> u32 {
        self.tracks
            .get(&kind)
            .and_then(|track| track.upgrades.keys().next_back().copied())
            .map_or(1, |top| top.saturating_add(1))
    }

    /// Set whether upgrades deduct their cost.
    #[must_use]
    pub const fn with_charge_upgrade_cost(mut self, charge: bool) -> Self {
        self.charge_upgrade_cost = charge;
        self
    }

    /// Check that every kind has a track and that every level a factory can
    /// reach has a production rate.
    ///
    /// # Errors
    ///
    /// Returns the first [`RulesError`] found.
    pub fn validate(&self) -> Result<(), RulesError> {
        for kind in ResourceKind::ALL {
            let track = self
                .tracks
                .get(&kind)
                .ok_or(RulesError::MissingTrack(kind))?;

            if track.production.contains_key(&0) || track.upgrades.contains_key(&0) {
                return Err(RulesError::LevelZero { resource: kind });
            }

            let reachable = core::iter::once(1)
                .chain(track.upgrades.keys().map(|level| level.saturating_add(1)));
            for level in reachable {
                if !track.production.contains_key(&level) {
                    return Err(RulesError::MissingProductionRate {
                        resource: kind,
                        level,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        const COOLDOWNS: [u64; 4] = [15, 30, 60, 90];

        let track = |rates: [u64; 5], costs: [Resources; 4]| TrackRules {
            production: (1..).zip(rates).collect(),
            upgrades: (1..)
                .zip(costs.into_iter().zip(COOLDOWNS))
                .map(|(level, (cost, cooldown_secs))| {
                    (level, UpgradeRequirement { cost, cooldown_secs })
                })
                .collect(),
        };

        let mut tracks = BTreeMap::new();
        tracks.insert(
            ResourceKind::Iron,
            track(
                [10, 20, 40, 80, 150],
                [
                    Resources::new(300, 100, 1),
                    Resources::new(800, 250, 2),
                    Resources::new(1600, 500, 4),
                    Resources::new(3000, 1000, 8),
                ],
            ),
        );
        tracks.insert(
            ResourceKind::Copper,
            track(
                [3, 7, 14, 30, 60],
                [
                    Resources::new(200, 70, 0),
                    Resources::new(400, 150, 0),
                    Resources::new(800, 300, 0),
                    Resources::new(1600, 600, 0),
                ],
            ),
        );
        // The gold track never asks for gold.
        tracks.insert(
            ResourceKind::Gold,
            track(
                [2, 3, 4, 6, 8],
                [
                    Resources::new(0, 100, 0),
                    Resources::new(0, 200, 0),
                    Resources::new(0, 400, 0),
                    Resources::new(0, 800, 0),
                ],
            ),
        );

        Self {
            tracks,
            charge_upgrade_cost: false,
        }
    }
}
