//! The session store: persistence under a coarse reader/writer lock.
//!
//! # Concurrency discipline
//!
//! ```text
//! get / list        -- shared    (any number at once)
//! create / set      -- exclusive (excludes every other store call)
//! update_with       -- exclusive for the whole fetch -> compute -> write
//! ```
//!
//! The write lock covers an entire mutating call, so a reader never sees a
//! half-written record. [`SessionStore::update_with`] is the only safe way
//! to do read-modify-write: a caller that does `get`, computes, then `set`
//! can silently overwrite a write that landed in between.
//!
//! Sessions returned by the store are independent copies. Changing one does
//! nothing until it is written back.

use foundry_game::{Session, UserId};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::repository::SessionRepository;
use crate::row::SessionRow;

/// Session persistence guarded by a single reader/writer lock.
#[derive(Debug)]
pub struct SessionStore<R> {
    repository: R,
    lock: RwLock<()>,
}

impl<R: SessionRepository> SessionStore<R> {
    /// Wrap a repository.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            lock: RwLock::new(()),
        }
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Register a player with a fresh session stamped at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::AlreadyExists`] if the player is already
    /// registered; the stored session is left untouched.
    pub async fn create(&self, user: UserId, now: i64) -> Result<Session, DbError> {
        let _guard = self.lock.write().await;
        let session = Session::new(user, now);
        self.repository.insert(&SessionRow::from(&session)).await?;
        tracing::info!(user = %session.user, "Session created");
        Ok(session)
    }

    /// Read a player's session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the player is unknown, or
    /// [`DbError::Decode`] if the stored record is corrupt.
    pub async fn get(&self, user: &UserId) -> Result<Session, DbError> {
        let _guard = self.lock.read().await;
        self.fetch(user).await
    }

    /// Overwrite a player's stored session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoRowsAffected`] if the player is unknown. Never
    /// inserts.
    pub async fn set(&self, session: &Session) -> Result<(), DbError> {
        let _guard = self.lock.write().await;
        self.repository.update(&SessionRow::from(session)).await
    }

    /// Read every stored session.
    ///
    /// Records that fail to decode are logged and left out, so one corrupt
    /// row cannot hide every other player from the tick engine.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the read itself fails.
    pub async fn list(&self) -> Result<Vec<Session>, DbError> {
        let _guard = self.lock.read().await;
        let rows = self.repository.fetch_all().await?;
        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            match Session::try_from(row) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(error = %e, "Skipping corrupt session record"),
            }
        }
        Ok(sessions)
    }

    /// Read, transform, and write back one session as a single exclusive
    /// critical section.
    ///
    /// `f` receives the current stored session. Returning `Ok(Some(next))`
    /// writes `next`; `Ok(None)` writes nothing; `Err` aborts without
    /// writing. Returns the session as stored when the call ends.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or any [`DbError`] from the fetch or the write.
    pub async fn update_with<F, E>(&self, user: &UserId, f: F) -> Result<Session, E>
    where
        F: FnOnce(&Session) -> Result<Option<Session>, E> + Send,
        E: From<DbError>,
    {
        let _guard = self.lock.write().await;
        let current = self.fetch(user).await?;
        match f(&current)? {
            Some(next) => {
                self.repository.update(&SessionRow::from(&next)).await?;
                Ok(next)
            }
            None => Ok(current),
        }
    }

    /// Fetch and decode without taking the lock. Callers hold it.
    async fn fetch(&self, user: &UserId) -> Result<Session, DbError> {
        let row = self
            .repository
            .fetch(user)
            .await?
            .ok_or_else(|| DbError::NotFound(user.clone()))?;
        Session::try_from(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use foundry_game::Resources;

    use super::*;
    use crate::memory::MemorySessionRepository;

    const T0: i64 = 1_700_000_000;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn store() -> SessionStore<MemorySessionRepository> {
        SessionStore::new(MemorySessionRepository::new())
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = store();
        let created = store.create(user("john"), T0).await.unwrap();
        let fetched = store.get(&user("john")).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.resources, Resources::ZERO);
        assert_eq!(fetched.factories.iron.level, 1);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected_and_keeps_original() {
        let store = store();
        let original = store.create(user("john"), T0).await.unwrap();
        let err = store.create(user("john"), T0 + 100).await;
        assert!(matches!(err, Err(DbError::AlreadyExists(ref u)) if u.as_str() == "john"));
        assert_eq!(store.get(&user("john")).await.unwrap(), original);
        assert_eq!(store.repository().len().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let store = store();
        let err = store.get(&user("nobody")).await;
        assert!(matches!(err, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_corrupt_record_is_decode_error() {
        let store = store();
        let mut row = SessionRow::from(&Session::new(user("john"), T0));
        row.copper = -1;
        store.repository().insert_raw(row).await;
        assert!(matches!(
            store.get(&user("john")).await,
            Err(DbError::Decode { .. })
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_unknown_user_affects_no_rows() {
        let store = store();
        let ghost = Session::new(user("ghost"), T0);
        let err = store.set(&ghost).await;
        assert!(matches!(err, Err(DbError::NoRowsAffected { .. })));
        assert!(store.repository().is_empty().await);
    }

    #[tokio::test]
    async fn returned_sessions_are_copies() {
        let store = store();
        let mut session = store.create(user("john"), T0).await.unwrap();
        session.resources.iron = 999;
        assert_eq!(store.get(&user("john")).await.unwrap().resources.iron, 0);
        store.set(&session).await.unwrap();
        assert_eq!(store.get(&user("john")).await.unwrap().resources.iron, 999);
    }

    #[tokio::test]
    async fn list_returns_every_session() {
        let store = store();
        for name in ["a", "b", "c"] {
            store.create(user(name), T0).await.unwrap();
        }
        let mut names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user.to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_with_none_writes_nothing() {
        let store = store();
        let created = store.create(user("john"), T0).await.unwrap();
        let result: Result<Session, DbError> =
            store.update_with(&user("john"), |_| Ok(None)).await;
        assert_eq!(result.unwrap(), created);
    }

    #[tokio::test]
    async fn update_with_error_writes_nothing() {
        let store = store();
        let created = store.create(user("john"), T0).await.unwrap();
        let result: Result<Session, DbError> = store
            .update_with(&user("john"), |_| Err(DbError::Config("refused".to_owned())))
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(&user("john")).await.unwrap(), created);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn readers_wait_for_critical_section() {
        let store = Arc::new(store());
        store.create(user("john"), T0).await.unwrap();

        let (entered_tx, entered_rx) = std::sync::mpsc::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update_with(&user("john"), move |current| {
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                        let mut next = current.clone();
                        next.resources.gold = 7;
                        Ok::<_, DbError>(Some(next))
                    })
                    .await
            })
        };

        tokio::task::spawn_blocking(move || entered_rx.recv().unwrap())
            .await
            .unwrap();

        // The write lock is held: a read cannot complete yet.
        let blocked = tokio::time::timeout(Duration::from_millis(50), store.get(&user("john"))).await;
        assert!(blocked.is_err());

        release_tx.send(()).unwrap();
        writer.await.unwrap().unwrap();
        assert_eq!(store.get(&user("john")).await.unwrap().resources.gold, 7);
    }
}
