//! Configuration, game service, and tick engine for the Foundry idle game.
//!
//! This crate sits between the pure game model (`foundry-game`) and the
//! outer surfaces. It reads configuration, exposes the player operations,
//! and runs the periodic accrual loop. Both the service and the tick engine
//! share one [`SessionStore`](foundry_db::SessionStore), one rule set, and
//! one clock.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `foundry-config.yaml` into
//!   strongly-typed structs.
//! - [`service`] -- [`GameService`]: register, read, and upgrade.
//! - [`tick`] -- [`TickEngine`]: periodic accrual with cooperative stop.

pub mod config;
pub mod service;
pub mod tick;

pub use config::{Backend, ConfigError, FoundryConfig, GameConfig, InfrastructureConfig, LoggingConfig};
pub use service::{GameService, ServiceError};
pub use tick::{TickEngine, TickError, TickHandle, TickSummary};
