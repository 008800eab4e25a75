//! Player sessions: the stockpile, the three factories, and time-based
//! accrual.
//!
//! Every operation here is pure. Sessions handed out by the store are
//! independent copies; a changed session only persists once the caller
//! writes it back.

use serde::{Deserialize, Serialize};

use crate::error::UpgradeError;
use crate::factory::Factory;
use crate::resource::{ResourceKind, Resources};
use crate::rules::Rules;
use crate::user::UserId;

/// One factory per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factories {
    /// The iron factory.
    pub iron: Factory,
    /// The copper factory.
    pub copper: Factory,
    /// The gold factory.
    pub gold: Factory,
}

impl Factories {
    /// Three level-1 factories created at `now`.
    pub const fn new(now: i64) -> Self {
        Self {
            iron: Factory::new(ResourceKind::Iron, now),
            copper: Factory::new(ResourceKind::Copper, now),
            gold: Factory::new(ResourceKind::Gold, now),
        }
    }

    /// The factory for a resource kind.
    pub const fn get(&self, kind: ResourceKind) -> &Factory {
        match kind {
            ResourceKind::Iron => &self.iron,
            ResourceKind::Copper => &self.copper,
            ResourceKind::Gold => &self.gold,
        }
    }

    const fn get_mut(&mut self, kind: ResourceKind) -> &mut Factory {
        match kind {
            ResourceKind::Iron => &mut self.iron,
            ResourceKind::Copper => &mut self.copper,
            ResourceKind::Gold => &mut self.gold,
        }
    }
}

/// A player's complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The owning player.
    pub user: UserId,
    /// The stockpile (ledger).
    pub resources: Resources,
    /// The three producers.
    pub factories: Factories,
    /// Epoch seconds of the last accrual.
    pub last_updated: i64,
}

/// Outcome of [`Session::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accrual {
    /// No time has elapsed; the session is returned as-is.
    Unchanged(Session),
    /// Resources were produced and `last_updated` moved forward.
    Accrued(Session),
}

impl Accrual {
    /// Whether the session changed and needs writing back.
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Accrued(_))
    }

    /// The resulting session, changed or not.
    pub fn into_session(self) -> Session {
        match self {
            Self::Unchanged(session) | Self::Accrued(session) => session,
        }
    }

    /// The resulting session, only if it changed.
    pub fn into_changed(self) -> Option<Session> {
        match self {
            Self::Accrued(session) => Some(session),
            Self::Unchanged(_) => None,
        }
    }
}

impl Session {
    /// A fresh session: empty stockpile, level-1 factories, clocks at `now`.
    pub const fn new(user: UserId, now: i64) -> Self {
        Self {
            user,
            resources: Resources::ZERO,
            factories: Factories::new(now),
            last_updated: now,
        }
    }

    /// Resources the factories produce over `elapsed_secs` at their current
    /// levels.
    pub fn production_over(&self, rules: &Rules, elapsed_secs: u64) -> Resources {
        let mut produced = Resources::ZERO;
        for kind in ResourceKind::ALL {
            let rate = self.factories.get(kind).production_rate(rules);
            *produced.get_mut(kind) = rate.saturating_mul(elapsed_secs);
        }
        produced
    }

    /// Accrue production for the time elapsed since `last_updated`.
    ///
    /// Rates are taken from the factory levels as they stand at the start of
    /// the call. If no time has passed, or the clock went backwards, the
    /// session is returned unchanged.
    pub fn update(&self, rules: &Rules, now: i64) -> Accrual {
        let elapsed = now.saturating_sub(self.last_updated);
        let Ok(elapsed_secs) = u64::try_from(elapsed) else {
            return Accrual::Unchanged(self.clone());
        };
        if elapsed_secs == 0 {
            return Accrual::Unchanged(self.clone());
        }

        let produced = self.production_over(rules, elapsed_secs);
        Accrual::Accrued(Self {
            user: self.user.clone(),
            resources: self.resources.saturating_add(produced),
            factories: self.factories,
            last_updated: now,
        })
    }

    /// Upgrade the factory for `kind`.
    ///
    /// The factory sees the current stockpile. When
    /// [`Rules::charge_upgrade_cost`] is set the cost is deducted from the
    /// returned session; otherwise the stockpile is left as it was.
    ///
    /// # Errors
    ///
    /// Propagates the factory's [`UpgradeError`] unchanged.
    pub fn upgrade(
        &self,
        kind: ResourceKind,
        rules: &Rules,
        now: i64,
    ) -> Result<Self, UpgradeError> {
        let current = self.factories.get(kind);
        let upgraded = current.upgrade(rules, &self.resources, now)?;

        let mut next = self.clone();
        *next.factories.get_mut(kind) = upgraded;

        if rules.charge_upgrade_cost {
            let requirement = rules.upgrade_requirement(kind, current.level).ok_or(
                UpgradeError::UnknownLevel {
                    resource: kind,
                    level: current.level,
                },
            )?;
            // The factory already checked coverage, so this cannot underflow.
            next.resources = self
                .resources
                .checked_sub(requirement.cost)
                .ok_or(UpgradeError::InsufficientResources {
                    resource: kind,
                    level: current.level,
                    required: requirement.cost,
                    available: self.resources,
                })?;
        }

        tracing::debug!(
            user = %self.user,
            resource = %kind,
            from_level = current.level,
            to_level = upgraded.level,
            "Factory upgraded"
        );
        Ok(next)
    }
}
