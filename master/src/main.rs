mod config;
mod coordinator;
mod handlers;
mod monitor;
mod state;
mod task_store;


use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Config};
use crate::coordinator::Coordinator;
use crate::state::AppState;

/// Filtro de logs si no hay RUST_LOG; el target es el nombre del binario.
const DEFAULT_LOG_FILTER: &str = "mrmaster=debug,common=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_args(Args::parse())?;

    let coordinator = Coordinator::new(config.files.clone(), config.n_reduce, config.lease_timeout)?;
    info!(
        "job creado: {} tareas map, {} tareas reduce, lease de {:?}",
        coordinator.n_map(),
        coordinator.n_reduce(),
        config.lease_timeout
    );

    let state = AppState::new(coordinator);

    // router HTTP
    let app = handlers::build_router(state.clone());

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("no se pudo escuchar en el puerto {}", config.port))?;
    info!("master escuchando en {}", listener.local_addr()?);

    // el servidor se apaga solo cuando el job termina
    axum::serve(listener, app)
        .with_graceful_shutdown(monitor::wait_job_done(state, config.shutdown_grace))
        .await?;

    info!("master terminado");
    Ok(())
}
