//! Per-resource producers and the upgrade state machine.
//!
//! A [`Factory`] is plain data: its level and the time of its last upgrade.
//! Production rates and upgrade requirements come from [`Rules`].
//!
//! ```text
//! level L --(cost covered, cooldown elapsed)--> level L+1, clock reset
//!         --(no entry for L)------------------> UnknownLevel
//!         --(cost not covered)----------------> InsufficientResources
//!         --(cooldown not elapsed)------------> CooldownActive
//! ```

use serde::{Deserialize, Serialize};

use crate::error::UpgradeError;
use crate::resource::{ResourceKind, Resources};
use crate::rules::Rules;

/// A producer for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    /// Current level, starting at 1.
    pub level: u32,
    /// The resource this factory produces.
    pub resource: ResourceKind,
    /// Epoch seconds of the last successful upgrade (or creation).
    pub last_updated: i64,
}

impl Factory {
    /// A level-1 factory whose cooldown clock starts at `now`.
    pub const fn new(resource: ResourceKind, now: i64) -> Self {
        Self {
            level: 1,
            resource,
            last_updated: now,
        }
    }

    /// Units produced per second at the current level.
    ///
    /// A level with no configured rate produces nothing.
    pub fn production_rate(&self, rules: &Rules) -> u64 {
        rules
            .production_rate(self.resource, self.level)
            .unwrap_or_else(|| {
                tracing::warn!(
                    resource = %self.resource,
                    level = self.level,
                    "No production rate configured for factory level"
                );
                0
            })
    }

    /// Compute the upgraded factory.
    ///
    /// Pure: neither `self` nor `stockpile` is modified. The caller decides
    /// what to do with the cost.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::UnknownLevel`] if no upgrade is defined out of the
    ///   current level.
    /// - [`UpgradeError::InsufficientResources`] if any stockpile counter is
    ///   below the cost.
    /// - [`UpgradeError::CooldownActive`] if fewer than the required seconds
    ///   have passed since `last_updated`.
    pub fn upgrade(
        &self,
        rules: &Rules,
        stockpile: &Resources,
        now: i64,
    ) -> Result<Self, UpgradeError> {
        let requirement = rules
            .upgrade_requirement(self.resource, self.level)
            .ok_or(UpgradeError::UnknownLevel {
                resource: self.resource,
                level: self.level,
            })?;

        if !stockpile.covers(&requirement.cost) {
            return Err(UpgradeError::InsufficientResources {
                resource: self.resource,
                level: self.level,
                required: requirement.cost,
                available: *stockpile,
            });
        }

        // Negative elapsed (clock skew) counts as zero.
        let elapsed = u64::try_from(now.saturating_sub(self.last_updated)).unwrap_or(0);
        if elapsed < requirement.cooldown_secs {
            return Err(UpgradeError::CooldownActive {
                resource: self.resource,
                remaining_secs: requirement.cooldown_secs.saturating_sub(elapsed),
            });
        }

        Ok(Self {
            level: self.level.saturating_add(1),
            resource: self.resource,
            last_updated: now.max(self.last_updated),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;

    fn iron_factory() -> Factory {
        Factory::new(ResourceKind::Iron, T0)
    }

    #[test]
    fn upgrade_succeeds_when_cost_and_cooldown_met() {
        let rules = Rules::default();
        let upgraded = iron_factory().upgrade(&rules, &Resources::new(300, 100, 1), T0 + 20);
        assert_eq!(
            upgraded,
            Ok(Factory {
                level: 2,
                resource: ResourceKind::Iron,
                last_updated: T0 + 20,
            })
        );
    }

    #[test]
    fn upgrade_at_exact_cooldown_boundary_succeeds() {
        let rules = Rules::default();
        let upgraded = iron_factory().upgrade(&rules, &Resources::new(300, 100, 1), T0 + 15);
        assert_eq!(upgraded.map(|f| f.level), Ok(2));
    }

    #[test]
    fn upgrade_during_cooldown_fails() {
        let rules = Rules::default();
        let result = iron_factory().upgrade(&rules, &Resources::new(300, 100, 1), T0 + 5);
        assert_eq!(
            result,
            Err(UpgradeError::CooldownActive {
                resource: ResourceKind::Iron,
                remaining_secs: 10,
            })
        );
    }

    #[test]
    fn upgrade_with_one_short_counter_fails() {
        let rules = Rules::default();
        let stock = Resources::new(299, 100, 1);
        let result = iron_factory().upgrade(&rules, &stock, T0 + 20);
        assert_eq!(
            result,
            Err(UpgradeError::InsufficientResources {
                resource: ResourceKind::Iron,
                level: 1,
                required: Resources::new(300, 100, 1),
                available: stock,
            })
        );
    }

    #[test]
    fn cost_is_checked_before_cooldown() {
        let rules = Rules::default();
        let result = iron_factory().upgrade(&rules, &Resources::ZERO, T0);
        assert!(matches!(
            result,
            Err(UpgradeError::InsufficientResources { .. })
        ));
    }

    #[test]
    fn max_level_factory_cannot_upgrade() {
        let rules = Rules::default();
        let factory = Factory {
            level: 5,
            resource: ResourceKind::Copper,
            last_updated: T0,
        };
        let rich = Resources::new(u64::MAX, u64::MAX, u64::MAX);
        assert_eq!(
            factory.upgrade(&rules, &rich, T0 + 10_000),
            Err(UpgradeError::UnknownLevel {
                resource: ResourceKind::Copper,
                level: 5,
            })
        );
    }

    #[test]
    fn gold_level_one_needs_only_copper() {
        let rules = Rules::default();
        let factory = Factory::new(ResourceKind::Gold, T0);
        let upgraded = factory.upgrade(&rules, &Resources::new(0, 100, 0), T0 + 15);
        assert_eq!(upgraded.map(|f| f.level), Ok(2));
    }

    #[test]
    fn clock_skew_never_rewinds_last_updated() {
        let rules = Rules::default();
        let factory = Factory {
            level: 1,
            resource: ResourceKind::Iron,
            last_updated: T0,
        };
        // Now is behind the factory clock: counts as zero elapsed.
        let result = factory.upgrade(&rules, &Resources::new(300, 100, 1), T0 - 100);
        assert!(matches!(
            result,
            Err(UpgradeError::CooldownActive {
                remaining_secs: 15,
                ..
            })
        ));
    }

    #[test]
    fn each_level_cools_down_longer() {
        let rules = Rules::default();
        let rich = Resources::new(10_000, 10_000, 10_000);
        let mut factory = Factory::new(ResourceKind::Iron, T0);
        let mut now = T0;
        for (level, cooldown) in [(1, 15), (2, 30), (3, 60), (4, 90)] {
            assert_eq!(factory.level, level);
            let early = factory.upgrade(&rules, &rich, now + cooldown - 1);
            assert!(matches!(early, Err(UpgradeError::CooldownActive { .. })));
            now += cooldown;
            factory = factory.upgrade(&rules, &rich, now).unwrap_or(factory);
            assert_eq!(factory.last_updated, now);
        }
        assert_eq!(factory.level, 5);
    }
}
