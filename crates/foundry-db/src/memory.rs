//! In-process session repository.
//!
//! Same contract as the `PostgreSQL` backend, held in a [`BTreeMap`]. Used
//! when the server runs with `backend: memory` and by hermetic tests.

use std::collections::BTreeMap;

use foundry_game::UserId;
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::repository::SessionRepository;
use crate::row::SessionRow;

/// Session rows kept in memory, keyed by `user_id`.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    rows: RwLock<BTreeMap<String, SessionRow>>,
}

impl MemorySessionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row as-is, replacing any existing row for the same user.
    ///
    /// Bypasses every check, so tests can seed corrupt records.
    pub async fn insert_raw(&self, row: SessionRow) {
        self.rows.write().await.insert(row.user_id.clone(), row);
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn insert(&self, row: &SessionRow) -> Result<(), DbError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&row.user_id) {
            let user = UserId::new(row.user_id.clone()).map_err(|e| DbError::Decode {
                user: row.user_id.clone(),
                reason: e.to_string(),
            })?;
            return Err(DbError::AlreadyExists(user));
        }
        rows.insert(row.user_id.clone(), row.clone());
        Ok(())
    }

    async fn fetch(&self, user: &UserId) -> Result<Option<SessionRow>, DbError> {
        Ok(self.rows.read().await.get(user.as_str()).cloned())
    }

    async fn update(&self, row: &SessionRow) -> Result<(), DbError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&row.user_id) {
            Some(existing) => {
                existing.clone_from(row);
                Ok(())
            }
            None => Err(DbError::NoRowsAffected {
                operation: "UPDATE sessions",
                user: row.user_id.clone(),
            }),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<SessionRow>, DbError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }
}
