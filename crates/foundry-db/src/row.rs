//! Decomposed column layout for a stored session.
//!
//! One [`SessionRow`] per player, one column per counter, level, and clock.
//! Encoding never fails: accrual already stops counters at
//! [`Resources::MAX_COUNTER`], and levels beyond the column range are
//! clamped. Decoding rejects anything that is not a valid session.

use foundry_game::{Factories, Factory, ResourceKind, Resources, Session, UserId};

use crate::error::DbError;

/// A row of the `sessions` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRow {
    /// Player name (primary key).
    pub user_id: String,
    /// Iron stockpile.
    pub iron: i64,
    /// Copper stockpile.
    pub copper: i64,
    /// Gold stockpile.
    pub gold: i64,
    /// Iron factory level.
    pub iron_level: i32,
    /// Copper factory level.
    pub copper_level: i32,
    /// Gold factory level.
    pub gold_level: i32,
    /// Epoch seconds of the iron factory's last upgrade.
    pub iron_upgraded_at: i64,
    /// Epoch seconds of the copper factory's last upgrade.
    pub copper_upgraded_at: i64,
    /// Epoch seconds of the gold factory's last upgrade.
    pub gold_upgraded_at: i64,
    /// Epoch seconds of the last accrual.
    pub last_updated: i64,
}

impl From<&Session> for SessionRow {
    fn from(session: &Session) -> Self {
        let counter = |value: u64| i64::try_from(value).unwrap_or(i64::MAX);
        let level = |factory: &Factory| i32::try_from(factory.level).unwrap_or(i32::MAX);
        let factories = &session.factories;

        Self {
            user_id: session.user.as_str().to_owned(),
            iron: counter(session.resources.iron),
            copper: counter(session.resources.copper),
            gold: counter(session.resources.gold),
            iron_level: level(&factories.iron),
            copper_level: level(&factories.copper),
            gold_level: level(&factories.gold),
            iron_upgraded_at: factories.iron.last_updated,
            copper_upgraded_at: factories.copper.last_updated,
            gold_upgraded_at: factories.gold.last_updated,
            last_updated: session.last_updated,
        }
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let user = UserId::new(row.user_id.clone()).map_err(|e| row.corrupt(&e.to_string()))?;

        let resources = Resources::new(
            row.counter("iron", row.iron)?,
            row.counter("copper", row.copper)?,
            row.counter("gold", row.gold)?,
        );

        let factories = Factories {
            iron: row.factory(ResourceKind::Iron, row.iron_level, row.iron_upgraded_at)?,
            copper: row.factory(ResourceKind::Copper, row.copper_level, row.copper_upgraded_at)?,
            gold: row.factory(ResourceKind::Gold, row.gold_level, row.gold_upgraded_at)?,
        };

        Ok(Self {
            user,
            resources,
            factories,
            last_updated: row.last_updated,
        })
    }
}

impl SessionRow {
    fn corrupt(&self, reason: &str) -> DbError {
        DbError::Decode {
            user: self.user_id.clone(),
            reason: reason.to_owned(),
        }
    }

    fn counter(&self, column: &str, value: i64) -> Result<u64, DbError> {
        u64::try_from(value)
            .map_err(|e| self.corrupt(&format!("{column} is negative ({value}): {e}")))
    }

    fn factory(&self, resource: ResourceKind, level: i32, upgraded_at: i64) -> Result<Factory, DbError> {
        let level = u32::try_from(level)
            .ok()
            .filter(|level| *level >= 1)
            .ok_or_else(|| self.corrupt(&format!("{resource} level {level} is below 1")))?;
        Ok(Factory {
            level,
            resource,
            last_updated: upgraded_at,
        })
    }
}
