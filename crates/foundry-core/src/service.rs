//! The game service: register, read, and upgrade player sessions.
//!
//! [`GameService`] is the logical surface the HTTP layer calls. It parses
//! raw input, reads the clock once per call, and routes every mutation
//! through the [`SessionStore`] so the store's lock discipline holds.

use std::sync::Arc;

use foundry_db::{DbError, SessionRepository, SessionStore};
use foundry_game::{
    Clock, ParseResourceError, ResourceKind, Rules, Session, UpgradeError, UserId, UserIdError,
};

/// Errors returned by [`GameService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The player name is not acceptable.
    #[error("invalid user name: {0}")]
    InvalidUser(#[from] UserIdError),

    /// The resource name is not one of iron, copper, or gold.
    #[error(transparent)]
    InvalidResource(#[from] ParseResourceError),

    /// No session exists for the player.
    #[error("no session for user {0}")]
    NotFound(UserId),

    /// The player already has a session.
    #[error("user {0} is already registered")]
    AlreadyRegistered(UserId),

    /// The game rules refused the upgrade. Nothing was written.
    #[error("upgrade refused: {0}")]
    Upgrade(#[from] UpgradeError),

    /// The store failed to read or write.
    #[error("persistence failure: {0}")]
    Persistence(DbError),
}

impl ServiceError {
    /// Whether the caller sent malformed input.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidUser(_) | Self::InvalidResource(_))
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(user) => Self::NotFound(user),
            DbError::AlreadyExists(user) => Self::AlreadyRegistered(user),
            other => Self::Persistence(other),
        }
    }
}

/// Player-facing game operations over a shared session store.
pub struct GameService<R> {
    store: Arc<SessionStore<R>>,
    rules: Arc<Rules>,
    clock: Arc<dyn Clock>,
}

impl<R> Clone for GameService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rules: Arc::clone(&self.rules),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: SessionRepository> GameService<R> {
    /// Create a service over a store, rule set, and clock.
    pub const fn new(store: Arc<SessionStore<R>>, rules: Arc<Rules>, clock: Arc<dyn Clock>) -> Self {
        Self { store, rules, clock }
    }

    /// The shared store.
    pub const fn store(&self) -> &Arc<SessionStore<R>> {
        &self.store
    }

    /// The active rule set.
    pub const fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    /// The clock used to stamp operations.
    pub const fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Register a new player with an empty stockpile and level-1 factories.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidUser`] for a bad name, or
    /// [`ServiceError::AlreadyRegistered`] if the name is taken.
    pub async fn register_user(&self, name: &str) -> Result<Session, ServiceError> {
        let user = UserId::new(name)?;
        let session = self.store.create(user, self.clock.now()).await?;
        Ok(session)
    }

    /// A player's session as last stored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidUser`] for a bad name, or
    /// [`ServiceError::NotFound`] if the player is unknown.
    pub async fn get_session(&self, name: &str) -> Result<Session, ServiceError> {
        let user = UserId::new(name)?;
        Ok(self.store.get(&user).await?)
    }

    /// Upgrade one of a player's factories.
    ///
    /// Production up to now is accrued first, then the upgrade is checked
    /// against the accrued stockpile. Both happen inside one exclusive store
    /// critical section. A refused upgrade writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Upgrade`] if the rules refuse, or
    /// [`ServiceError::NotFound`] if the player is unknown.
    pub async fn upgrade(&self, name: &str, kind: ResourceKind) -> Result<Session, ServiceError> {
        let user = UserId::new(name)?;
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        let result = self
            .store
            .update_with(&user, move |current| {
                let accrued = current.update(&rules, now).into_session();
                let upgraded = accrued.upgrade(kind, &rules, now)?;
                Ok::<_, ServiceError>(Some(upgraded))
            })
            .await;

        match &result {
            Ok(session) => tracing::info!(
                user = %user,
                resource = %kind,
                level = session.factories.get(kind).level,
                "Factory upgraded"
            ),
            Err(ServiceError::Upgrade(e)) => tracing::warn!(
                user = %user,
                resource = %kind,
                reason = e.kind(),
                "Upgrade refused"
            ),
            Err(_) => {}
        }
        result
    }

    /// Upgrade by resource name (`iron`, `copper`, `gold`).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidResource`] before touching the store
    /// if the name is unknown, otherwise as [`GameService::upgrade`].
    pub async fn upgrade_by_name(&self, name: &str, resource: &str) -> Result<Session, ServiceError> {
        let kind: ResourceKind = resource.parse()?;
        self.upgrade(name, kind).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use foundry_db::MemorySessionRepository;
    use foundry_game::{ManualClock, Resources};

    use super::*;

    const T0: i64 = 1_700_000_000;

    fn service() -> (GameService<MemorySessionRepository>, Arc<ManualClock>) {
        service_with(Rules::default())
    }

    fn service_with(rules: Rules) -> (GameService<MemorySessionRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let store = Arc::new(SessionStore::new(MemorySessionRepository::new()));
        let service = GameService::new(store, Arc::new(rules), Arc::clone(&clock) as Arc<dyn Clock>);
        (service, clock)
    }

    #[tokio::test]
    async fn register_then_get() {
        let (service, _) = service();
        let created = service.register_user("john").await.unwrap();
        assert_eq!(created.resources, Resources::ZERO);
        assert_eq!(created.last_updated, T0);
        assert_eq!(service.get_session("john").await.unwrap(), created);
    }

    #[tokio::test]
    async fn register_rejects_blank_and_duplicate_names() {
        let (service, _) = service();
        let blank = service.register_user("   ").await;
        assert!(matches!(blank, Err(ref e) if e.is_validation()));

        service.register_user("john").await.unwrap();
        let again = service.register_user("john").await;
        assert!(matches!(again, Err(ServiceError::AlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let (service, _) = service();
        let err = service.get_session("nobody").await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn upgrade_accrues_before_checking_cost() {
        let (service, clock) = service();
        service.register_user("john").await.unwrap();

        // 30s at level 1: 300 iron, 90 copper, 60 gold. Copper is short.
        clock.set(T0 + 30);
        let refused = service.upgrade("john", ResourceKind::Iron).await;
        assert!(matches!(
            refused,
            Err(ServiceError::Upgrade(UpgradeError::InsufficientResources { .. }))
        ));
        // A refusal writes nothing, accrual included.
        assert_eq!(service.get_session("john").await.unwrap().last_updated, T0);

        // 34s: 340 iron, 102 copper, 68 gold covers (300, 100, 1).
        clock.set(T0 + 34);
        let upgraded = service.upgrade("john", ResourceKind::Iron).await.unwrap();
        assert_eq!(upgraded.factories.iron.level, 2);
        assert_eq!(upgraded.factories.iron.last_updated, T0 + 34);
        assert_eq!(upgraded.resources, Resources::new(340, 102, 68));
        assert_eq!(upgraded.last_updated, T0 + 34);
        assert_eq!(service.get_session("john").await.unwrap(), upgraded);
    }

    #[tokio::test]
    async fn upgrade_respects_cooldown() {
        let (service, clock) = service();
        service.register_user("john").await.unwrap();

        clock.set(T0 + 10);
        let err = service.upgrade("john", ResourceKind::Gold).await;
        // Gold level 1 needs 100 copper; after 10s there are 30.
        assert!(matches!(
            err,
            Err(ServiceError::Upgrade(UpgradeError::InsufficientResources { .. }))
        ));

        clock.set(T0 + 40);
        let first = service.upgrade("john", ResourceKind::Gold).await.unwrap();
        assert_eq!(first.factories.gold.level, 2);

        // Level 2 needs 200 copper and 30s of cooldown. At +69 there are
        // 207 copper but only 29s have passed.
        clock.set(T0 + 69);
        let cooling = service.upgrade("john", ResourceKind::Gold).await;
        assert!(matches!(
            cooling,
            Err(ServiceError::Upgrade(UpgradeError::CooldownActive { .. }))
        ));
    }

    #[tokio::test]
    async fn charging_deducts_cost_once() {
        let (service, clock) = service_with(Rules::default().with_charge_upgrade_cost(true));
        service.register_user("john").await.unwrap();
        clock.set(T0 + 34);
        let upgraded = service.upgrade("john", ResourceKind::Iron).await.unwrap();
        assert_eq!(upgraded.resources, Resources::new(40, 2, 67));
    }

    #[tokio::test]
    async fn upgrade_by_name_validates_resource_first() {
        let (service, _) = service();
        let err = service.upgrade_by_name("nobody", "silver").await;
        assert!(matches!(err, Err(ServiceError::InvalidResource(_))));

        let err = service.upgrade_by_name("nobody", "IRON").await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn huge_rates_store_what_upgrade_returns() {
        let mut rules = Rules::default();
        for track in rules.tracks.values_mut() {
            for rate in track.production.values_mut() {
                *rate = 1_000_000_000_000_000_000;
            }
        }
        rules.validate().unwrap();

        let (service, clock) = service_with(rules);
        service.register_user("john").await.unwrap();
        clock.set(T0 + 15);

        let upgraded = service.upgrade("john", ResourceKind::Gold).await.unwrap();
        let stored = service.get_session("john").await.unwrap();
        assert_eq!(upgraded.resources, stored.resources);
        assert_eq!(stored.resources.iron, Resources::MAX_COUNTER);
        assert_eq!(stored, upgraded);
    }

    #[tokio::test]
    async fn max_level_factory_is_unknown_level() {
        let (service, _) = service();
        let mut session = service.register_user("john").await.unwrap();
        session.factories.copper.level = 5;
        session.resources = Resources::new(10_000, 10_000, 10_000);
        service.store().set(&session).await.unwrap();

        let err = service.upgrade("john", ResourceKind::Copper).await;
        assert!(matches!(
            err,
            Err(ServiceError::Upgrade(UpgradeError::UnknownLevel { level: 5, .. }))
        ));
    }
}
