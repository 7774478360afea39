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

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::Instrument;
use travel_manager::api::{self, MgmtState};
use travel_manager::config::Config;
use travel_manager::{AppBuilder, Workers, storage, telemetry};

/// Everything the server needs once the database is reachable and the ports are bound.
struct Runtime {
    api_listener: TcpListener,
    mgmt_listener: TcpListener,
    api_router: Router,
    mgmt_router: Router,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    workers: Workers,
}

async fn prepare(config: &Config) -> anyhow::Result<Runtime> {
    let pool = storage::init_pool(&config.database).await?;
    travel_manager::run_migrations(&pool).await?;
    tracing::info!("database schema is up to date");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    travel_manager::spawn_signal_handler(shutdown_tx.clone());

    let app = AppBuilder::new(config.clone()).with_database(pool).build()?;
    let api_router = api::app_router(config.clone(), app.services);
    let mgmt_router = api::mgmt_router(MgmtState { health_service: app.health_service });

    let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;
    let api_listener = TcpListener::bind(api_addr).await?;
    let mgmt_listener = TcpListener::bind(mgmt_addr).await?;

    tracing::info!(address = %api_addr, prefix = api::API_PREFIX, "travel API ready");
    tracing::info!(address = %mgmt_addr, "health probes ready");

    Ok(Runtime { api_listener, mgmt_listener, api_router, mgmt_router, shutdown_tx, shutdown_rx, workers: app.workers })
}

async fn serve(listener: TcpListener, router: Router, mut shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&stop| stop).await;
        })
        .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    travel_manager::setup_panic_hook();

    let runtime = prepare(&config).instrument(tracing::info_span!("startup")).await?;

    let worker_tasks = runtime.workers.spawn_all(runtime.shutdown_rx.clone());

    let served = tokio::try_join!(
        serve(runtime.api_listener, runtime.api_router, runtime.shutdown_rx.clone()),
        serve(runtime.mgmt_listener, runtime.mgmt_router, runtime.shutdown_rx),
    );
    if let Err(e) = served {
        tracing::error!(error = %e, "listener stopped unexpectedly");
    }

    // Listeners are down; give the cleanup worker a bounded window to stop.
    let _ = runtime.shutdown_tx.send(true);
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    if tokio::time::timeout(grace, futures::future::join_all(worker_tasks)).await.is_ok() {
        tracing::info!("background workers stopped");
    } else {
        tracing::warn!(grace_secs = config.server.shutdown_timeout_secs, "background workers still running at exit");
    }

    telemetry_guard.shutdown();
    Ok(())
}
