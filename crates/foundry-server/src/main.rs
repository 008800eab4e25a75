//! Server binary for the Foundry idle game.
//!
//! Wires configuration, storage, the tick engine, and the player API
//! together, then serves until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `foundry-config.yaml`
//! 3. Open the session backend (`PostgreSQL` with migrations, or memory)
//! 4. Build the session store and game service
//! 5. Start the tick engine (fails if the store is unreachable)
//! 6. Serve the player API until a shutdown signal
//! 7. Stop the tick engine, then close the pool

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use foundry_api::{AppState, ServerConfig};
use foundry_core::{Backend, FoundryConfig, GameService, TickEngine};
use foundry_db::{MemorySessionRepository, PostgresConfig, PostgresPool, SessionRepository, SessionStore};
use foundry_game::{Clock, Rules, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "foundry-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails or the API server stops
/// with an I/O error.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 1. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        backend = ?config.infrastructure.backend,
        tick_interval_ms = config.game.tick_interval_ms,
        charge_upgrade_cost = config.game.charge_upgrade_cost,
        "foundry-server starting"
    );

    let rules = Arc::new(config.game.rules()?);

    match config.infrastructure.backend {
        Backend::Postgres => {
            let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
                .with_max_connections(config.infrastructure.max_connections);
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.run_migrations().await?;

            let result = serve(&config, rules, pool.session_repository()).await;
            pool.close().await;
            result
        }
        Backend::Memory => {
            info!("Using in-memory backend; sessions are lost on exit");
            serve(&config, rules, MemorySessionRepository::new()).await
        }
    }
}

/// Run the tick engine and the API over one repository until shutdown.
async fn serve<R: SessionRepository>(
    config: &FoundryConfig,
    rules: Arc<Rules>,
    repository: R,
) -> Result<(), ServerError> {
    let store = Arc::new(SessionStore::new(repository));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let tick_handle = TickEngine::new(
        Arc::clone(&store),
        Arc::clone(&rules),
        Arc::clone(&clock),
        config.game.tick_interval(),
    )
    .start()
    .await?;

    let service = GameService::new(store, rules, clock);
    let server_config = ServerConfig {
        host: config.infrastructure.api_host.clone(),
        port: config.infrastructure.api_port,
    };

    let served = foundry_api::start_server(
        &server_config,
        Arc::new(AppState::new(service)),
        foundry_api::shutdown_signal(),
    )
    .await;

    // Stop ticking even if the server failed, so the pool closes cleanly.
    tick_handle.stop().await?;
    served?;

    info!("foundry-server stopped");
    Ok(())
}

/// The configuration path: `FOUNDRY_CONFIG` if set, else the default.
fn config_path() -> PathBuf {
    std::env::var_os("FOUNDRY_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration, falling back to defaults when the file is absent.
///
/// Environment overrides apply either way.
fn load_config(path: &Path) -> Result<FoundryConfig, ServerError> {
    if path.exists() {
        Ok(FoundryConfig::from_file(path)?)
    } else {
        let mut config = FoundryConfig::default();
        config.infrastructure.apply_env_overrides()?;
        Ok(config)
    }
}
