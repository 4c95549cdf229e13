mod worker;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::worker::WorkerConfig;

/// Filtro de logs si no hay RUST_LOG; el target es el nombre del binario.
const DEFAULT_LOG_FILTER: &str = "mrworker=debug,common=debug,reqwest=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    worker::run(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtro_por_defecto_apunta_a_este_binario() {
        let own = concat!(env!("CARGO_CRATE_NAME"), "=debug");
        assert!(DEFAULT_LOG_FILTER.split(',').any(|d| d == own));
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
