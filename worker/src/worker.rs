use anyhow::{anyhow, Context, Result};
use common::{
    app_by_name, engine, Assignment, DoneResponse, MapReduceApp, TaskAssignmentRequest,
    TaskAssignmentResponse, TaskCompleteRequest, TaskKind, WorkerId, APP_NAMES,
};
use reqwest::Client;
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info, warn};

const DEFAULT_MASTER_URL: &str = "http://localhost:8080";
const DEFAULT_APP: &str = "wc";
const DEFAULT_POLL_MS: u64 = 1000;
const DEFAULT_MAX_RPC_FAILURES: u32 = 10;

/// Configuración del worker, leída de variables de entorno:
/// - MASTER_URL (en Docker: http://master:8080)
/// - MR_APP: aplicación map/reduce incorporada
/// - MR_WORK_DIR: directorio compartido de shards y salidas
/// - WORKER_POLL_MS: pausa entre consultas sin tarea
/// - WORKER_MAX_RPC_FAILURES: fallos seguidos antes de dar al master por caído
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub master_url: String,
    pub app: String,
    pub work_dir: PathBuf,
    pub poll_interval: Duration,
    pub max_rpc_failures: u32,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("{key} inválido: {s}")),
                None => Ok(default),
            }
        };
        let max_rpc_failures = match lookup("WORKER_MAX_RPC_FAILURES") {
            Some(s) => s
                .parse::<u32>()
                .with_context(|| format!("WORKER_MAX_RPC_FAILURES inválido: {s}"))?,
            None => DEFAULT_MAX_RPC_FAILURES,
        };

        let app = lookup("MR_APP").unwrap_or_else(|| DEFAULT_APP.to_string());
        if app_by_name(&app).is_none() {
            return Err(anyhow!(
                "MR_APP desconocida: {app} (disponibles: {})",
                APP_NAMES.join(", ")
            ));
        }

        Ok(Self {
            master_url: lookup("MASTER_URL")
                .unwrap_or_else(|| DEFAULT_MASTER_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            app,
            work_dir: lookup("MR_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            poll_interval: Duration::from_millis(parse_or("WORKER_POLL_MS", DEFAULT_POLL_MS)?),
            max_rpc_failures,
        })
    }
}

/// Cliente HTTP de las tres llamadas al master.
#[derive(Clone)]
pub struct MasterClient {
    client: Client,
    base_url: String,
}

impl MasterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn query_done(&self) -> Result<bool> {
        let url = format!("{}/api/v1/done", self.base_url);
        let resp: DoneResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.done)
    }

    pub async fn request_task(&self, worker_id: &WorkerId) -> Result<Option<Assignment>> {
        let url = format!("{}/api/v1/tasks/next", self.base_url);
        let resp: TaskAssignmentResponse = self
            .client
            .post(&url)
            .json(&TaskAssignmentRequest {
                worker_id: worker_id.clone(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.task)
    }

    pub async fn submit_task(&self, kind: TaskKind, index: usize) -> Result<()> {
        let url = format!("{}/api/v1/tasks/complete", self.base_url);
        self.client
            .post(&url)
            .json(&TaskCompleteRequest { kind, index })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Resultado de una vuelta del loop.
enum Step {
    Done,
    Idle,
    Worked,
}

/// Loop principal del worker:
/// 1. pregunta si el job terminó (y sale si es así)
/// 2. pide tarea; si no hay, espera y reintenta
/// 3. ejecuta map o reduce con publicación atómica
/// 4. reporta la tarea y vuelve a empezar
///
/// Los errores de red se reintentan; tras `max_rpc_failures` seguidos se
/// asume que el master ya no está (termina al completar el job) y se sale.
pub async fn run(config: WorkerConfig) -> Result<()> {
    let app = app_by_name(&config.app).ok_or_else(|| anyhow!("app desconocida {}", config.app))?;
    let master = MasterClient::new(config.master_url.clone());

    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let worker_id: WorkerId = format!("{}-{}", hostname, uuid::Uuid::new_v4());

    info!(
        "worker {} arrancando contra {} (app={}, work_dir={})",
        worker_id,
        config.master_url,
        config.app,
        config.work_dir.display()
    );

    let mut consecutive_failures = 0u32;
    loop {
        match step(&master, &worker_id, app.clone(), &config).await {
            Ok(Step::Done) => {
                info!("job terminado, worker {} sale", worker_id);
                return Ok(());
            }
            Ok(Step::Idle) => {
                consecutive_failures = 0;
                sleep(config.poll_interval).await;
            }
            Ok(Step::Worked) => {
                consecutive_failures = 0;
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!(
                    "error hablando con el master ({}/{}): {:#}",
                    consecutive_failures, config.max_rpc_failures, e
                );
                if consecutive_failures >= config.max_rpc_failures {
                    warn!("el master no responde; asumiendo que el job terminó");
                    return Ok(());
                }
                sleep(config.poll_interval).await;
            }
        }
    }
}

async fn step(
    master: &MasterClient,
    worker_id: &WorkerId,
    app: Arc<dyn MapReduceApp>,
    config: &WorkerConfig,
) -> Result<Step> {
    if master.query_done().await? {
        return Ok(Step::Done);
    }

    let Some(task) = master.request_task(worker_id).await? else {
        debug!("no hay tareas, esperando {:?}...", config.poll_interval);
        return Ok(Step::Idle);
    };

    info!("tengo tarea {} (input={:?})", task, task.input);

    if !execute_task(app, task.clone(), config.work_dir.clone()).await {
        // sin reporte: el lease vence y otro worker la reintenta
        return Ok(Step::Worked);
    }

    master.submit_task(task.kind, task.index).await?;
    info!("tarea {} reportada al master", task);
    Ok(Step::Worked)
}

/// Corre la tarea en un hilo de bloqueo; devuelve si terminó bien.
async fn execute_task(app: Arc<dyn MapReduceApp>, task: Assignment, work_dir: PathBuf) -> bool {
    let label = task.to_string();
    let handle =
        tokio::task::spawn_blocking(move || engine::execute(app.as_ref(), &task, &work_dir));

    match handle.await {
        Ok(Ok(())) => {
            info!("terminé tarea {} correctamente", label);
            true
        }
        Ok(Err(e)) => {
            warn!("error procesando tarea {}: {}", label, e);
            false
        }
        Err(e) => {
            warn!("panic o join error en tarea {}: {:?}", label, e);
            false
        }
    }
}
