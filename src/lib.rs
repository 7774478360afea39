#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod workers;

use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::airline_service::AirlineService;
use crate::services::airport_service::AirportService;
use crate::services::auth_service::AuthService;
use crate::services::health_service::HealthService;
use crate::services::route_service::RouteService;
use crate::storage::DbPool;
use crate::storage::airline_repo::AirlineRepository;
use crate::storage::airport_repo::AirportRepository;
use crate::storage::refresh_token_repo::RefreshTokenRepository;
use crate::storage::route_repo::RouteRepository;
use crate::storage::user_repo::UserRepository;
use crate::workers::RefreshTokenCleanupWorker;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background tasks owned by the server process.
#[derive(Debug)]
pub struct Workers {
    refresh_token_cleanup: RefreshTokenCleanupWorker,
}

impl Workers {
    /// Spawns every worker onto the runtime. Each one exits once `shutdown_rx` flips to `true`.
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.refresh_token_cleanup.run(shutdown_rx))]
    }
}

#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
    pub workers: Workers,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Wires repositories and services together.
    ///
    /// # Errors
    /// Returns an error if no database pool was provided.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("database pool is required"))?;
        let config = self.config;

        let user_repo = UserRepository::new();
        let refresh_repo = RefreshTokenRepository::new();
        let airport_repo = AirportRepository::new();
        let airline_repo = AirlineRepository::new();
        let route_repo = RouteRepository::new();

        let auth_service = AuthService::new(config.auth.clone(), refresh_repo.clone());
        let account_service = AccountService::new(pool.clone(), user_repo, auth_service.clone());
        let airport_service = AirportService::new(pool.clone(), airport_repo.clone(), route_repo.clone(), airline_repo.clone());
        let route_service = RouteService::new(pool.clone(), route_repo.clone(), airport_repo.clone(), airline_repo.clone());
        let airline_service = AirlineService::new(pool.clone(), airline_repo, airport_repo, route_repo);
        let health_service = HealthService::new(pool.clone(), config.health.clone());

        let refresh_token_cleanup =
            RefreshTokenCleanupWorker::new(pool.clone(), refresh_repo, config.auth.refresh_cleanup_interval_secs);

        Ok(App {
            services: ServiceContainer {
                pool,
                auth_service,
                account_service,
                airport_service,
                airline_service,
                route_service,
            },
            health_service,
            workers: Workers { refresh_token_cleanup },
        })
    }
}

/// Applies the bundled SQL migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the structured log pipeline.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "process panicked");
        default_hook(info);
    }));
}
