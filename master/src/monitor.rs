use std::time::Duration;

use tracing::info;

use crate::state::AppState;

const DONE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Espera a que el job termine y deja `grace` extra para que los workers
/// que siguen consultando vean `done = true` antes de apagar el servidor.
/// Se usa como señal de apagado de axum.
pub async fn wait_job_done(state: AppState, grace: Duration) {
    loop {
        tokio::time::sleep(DONE_POLL_INTERVAL).await;

        let done = match state.coordinator.lock() {
            Ok(c) => c.is_done(),
            // con el mutex envenenado ya no hay forma de terminar el job
            Err(_) => true,
        };

        if done {
            break;
        }
    }

    info!("job completo, apagando el master en {:?}", grace);
    tokio::time::sleep(grace).await;
}
