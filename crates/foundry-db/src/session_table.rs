//! `PostgreSQL` repository over the `sessions` table.
//!
//! Each player is one row with a decomposed column layout (see
//! [`SessionRow`]). Queries are built at runtime (not compile-time
//! checked) so the crate builds without a live database. All queries are
//! parameterized.

use foundry_game::UserId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::repository::SessionRepository;
use crate::row::SessionRow;

/// Column list shared by every `SELECT`.
const COLUMNS: &str = "user_id, iron, copper, gold, iron_level, copper_level, gold_level, \
                       iron_upgraded_at, copper_upgraded_at, gold_upgraded_at, last_updated";

/// Operations on the `sessions` table.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a repository bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionRepository {
    async fn insert(&self, row: &SessionRow) -> Result<(), DbError> {
        let result = sqlx::query(
            r"INSERT INTO sessions (user_id, iron, copper, gold, iron_level, copper_level, gold_level, iron_upgraded_at, copper_upgraded_at, gold_upgraded_at, last_updated)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(&row.user_id)
        .bind(row.iron)
        .bind(row.copper)
        .bind(row.gold)
        .bind(row.iron_level)
        .bind(row.copper_level)
        .bind(row.gold_level)
        .bind(row.iron_upgraded_at)
        .bind(row.copper_upgraded_at)
        .bind(row.gold_upgraded_at)
        .bind(row.last_updated)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let user = UserId::new(row.user_id.clone()).map_err(|e| DbError::Decode {
                user: row.user_id.clone(),
                reason: e.to_string(),
            })?;
            return Err(DbError::AlreadyExists(user));
        }

        tracing::debug!(user = %row.user_id, "Inserted session row");
        Ok(())
    }

    async fn fetch(&self, user: &UserId) -> Result<Option<SessionRow>, DbError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {COLUMNS} FROM sessions WHERE user_id = $1"
        ))
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, row: &SessionRow) -> Result<(), DbError> {
        let result = sqlx::query(
            r"UPDATE sessions
              SET iron = $2, copper = $3, gold = $4,
                  iron_level = $5, copper_level = $6, gold_level = $7,
                  iron_upgraded_at = $8, copper_upgraded_at = $9, gold_upgraded_at = $10,
                  last_updated = $11
              WHERE user_id = $1",
        )
        .bind(&row.user_id)
        .bind(row.iron)
        .bind(row.copper)
        .bind(row.gold)
        .bind(row.iron_level)
        .bind(row.copper_level)
        .bind(row.gold_level)
        .bind(row.iron_upgraded_at)
        .bind(row.copper_upgraded_at)
        .bind(row.gold_upgraded_at)
        .bind(row.last_updated)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(DbError::NoRowsAffected {
                operation: "UPDATE sessions",
                user: row.user_id.clone(),
            });
        }

        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<SessionRow>, DbError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!("SELECT {COLUMNS} FROM sessions"))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Fetched all session rows");
        Ok(rows)
    }
}
