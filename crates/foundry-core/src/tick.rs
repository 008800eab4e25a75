//! The tick engine: periodic accrual for every stored session.
//!
//! Each tick runs two phases:
//!
//! 1. **Snapshot** -- [`SessionStore::list`] under the shared lock, then
//!    [`Session::update`] in memory to find the sessions that moved.
//!
//! 2. **Write-back** -- for each moved session, one exclusive
//!    [`SessionStore::update_with`] that re-applies accrual to the record
//!    as it is stored *now*. An upgrade that landed between the snapshot
//!    and the write-back is kept, and its accrual is never counted twice
//!    because `update` only covers time since the stored `last_updated`.
//!
//! One session failing to write is logged and counted; the rest of the tick
//! carries on. A failed snapshot skips the whole tick. Ticks never overlap:
//! the loop runs on one task and missed intervals are delayed, not burst.
//!
//! [`Session::update`]: foundry_game::Session::update

use std::sync::Arc;
use std::time::Duration;

use foundry_db::{DbError, SessionRepository, SessionStore};
use foundry_game::{Clock, Rules, UserId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Errors raised by the tick engine's lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The engine was built with a zero interval.
    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    /// The start-up read of the store failed.
    #[error("session store unreachable: {source}")]
    StoreUnreachable {
        /// The store error.
        source: DbError,
    },

    /// The tick task panicked or was cancelled.
    #[error("tick task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Counts from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number, starting at 1.
    pub tick: u64,
    /// Sessions in the snapshot.
    pub sessions: usize,
    /// Sessions written back with new production.
    pub accrued: usize,
    /// Sessions with no elapsed time, including those already brought
    /// current by an upgrade before their write-back.
    pub skipped: usize,
    /// Sessions whose write-back failed.
    pub failed: usize,
}

/// Drives periodic accrual over a session store.
pub struct TickEngine<R> {
    store: Arc<SessionStore<R>>,
    rules: Arc<Rules>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl<R: SessionRepository> TickEngine<R> {
    /// Create an engine that ticks every `interval`.
    pub fn new(
        store: Arc<SessionStore<R>>,
        rules: Arc<Rules>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            rules,
            clock,
            interval,
        }
    }

    /// The time between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick at the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns the store error if the snapshot cannot be read. Per-session
    /// write failures are counted in [`TickSummary::failed`] instead.
    pub async fn run_tick(&self, tick: u64) -> Result<TickSummary, DbError> {
        let now = self.clock.now();
        let snapshot = self.store.list().await?;

        let mut summary = TickSummary {
            tick,
            sessions: snapshot.len(),
            ..TickSummary::default()
        };

        for session in &snapshot {
            if !session.update(&self.rules, now).changed() {
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            }
            match self.accrue(&session.user, now).await {
                Ok(true) => summary.accrued = summary.accrued.saturating_add(1),
                Ok(false) => summary.skipped = summary.skipped.saturating_add(1),
                Err(e) => {
                    warn!(tick, user = %session.user, error = %e, "Session accrual failed");
                    summary.failed = summary.failed.saturating_add(1);
                }
            }
        }

        debug!(
            tick,
            sessions = summary.sessions,
            accrued = summary.accrued,
            skipped = summary.skipped,
            failed = summary.failed,
            "Tick complete"
        );
        Ok(summary)
    }

    /// Accrue one stored session up to `now` as an exclusive
    /// read-modify-write.
    ///
    /// Returns `true` if a new record was written, `false` if the stored
    /// record was already current.
    ///
    /// # Errors
    ///
    /// Returns the store error if the fetch or the write fails.
    pub async fn accrue(&self, user: &UserId, now: i64) -> Result<bool, DbError> {
        let mut wrote = false;
        self.store
            .update_with(user, |current| {
                let next = current.update(&self.rules, now).into_changed();
                wrote = next.is_some();
                Ok::<_, DbError>(next)
            })
            .await?;
        Ok(wrote)
    }

    /// Check the interval and the store, then spawn the tick loop.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::ZeroInterval`] if the interval is zero, or
    /// [`TickError::StoreUnreachable`] if the store cannot be read. Nothing
    /// is spawned in either case.
    pub async fn start(self) -> Result<TickHandle, TickError> {
        if self.interval.is_zero() {
            return Err(TickError::ZeroInterval);
        }

        let sessions = self
            .store
            .list()
            .await
            .map_err(|source| TickError::StoreUnreachable { source })?;

        info!(
            sessions = sessions.len(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Tick engine started"
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        Ok(TickHandle {
            stop: stop_tx,
            task,
        })
    }

    async fn run(self, mut stop_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        let mut tick: u64 = 0;
        loop {
            tokio::select! {
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    tick = tick.saturating_add(1);
                    if let Err(e) = self.run_tick(tick).await {
                        warn!(tick, error = %e, "Tick skipped: could not read sessions");
                    }
                }
            }
        }
        info!(ticks = tick, "Tick engine stopped");
    }
}

/// Control handle for a running tick engine.
///
/// Dropping the handle also stops the loop after the current tick.
#[derive(Debug)]
pub struct TickHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Whether the tick task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A tick already in progress finishes first.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Join`] if the tick task panicked.
    pub async fn stop(self) -> Result<(), TickError> {
        if self.stop.send(true).is_err() {
            debug!("Tick task already exited");
        }
        self.task.await?;
        Ok(())
    }
}
