use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use common::{app_by_name, sequential, CoordinatorStatus, DoneResponse, APP_NAMES};
use reqwest::Client;
use std::{env, path::PathBuf};

/// Igual que en el worker:
/// - En Docker: MASTER_URL=http://master:8080
/// - Local: default http://localhost:8080
fn master_base_url() -> String {
    env::var("MASTER_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[derive(Parser)]
#[command(name = "mrctl")]
#[command(about = "CLI simple para hablar con el master map/reduce")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Muestra fase, tareas pendientes y leases vigentes
    Status,
    /// Indica si el job terminó
    Done,
    /// Corre el job completo en local, sin master ni workers
    Sequential {
        /// Aplicación map/reduce (wc, indexer)
        #[arg(long, default_value = "wc")]
        app: String,

        /// Archivo de salida
        #[arg(long, default_value = "mr-out-0")]
        out: PathBuf,

        /// Archivos de entrada
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = master_base_url();

    match cli.command {
        Commands::Status => {
            let url = format!("{}/api/v1/status", base_url);
            let resp = client.get(&url).send().await?;
            if resp.status().is_success() {
                let st: CoordinatorStatus = resp.json().await?;
                println!("Job:");
                println!("  fase: {:?}", st.phase);
                println!("  tareas: map={}, reduce={}", st.n_map, st.n_reduce);
                println!(
                    "  pendientes: {} ({} con lease vigente)",
                    st.remaining_tasks, st.leased_tasks
                );
                println!("  iniciado: {}", st.started_at);
                if let Some(ref reduce) = st.reduce_started_at {
                    println!("  reduce desde: {}", reduce);
                }
                if let Some(ref done) = st.finished_at {
                    println!("  finalizado: {}", done);
                }
            } else {
                println!("Error consultando /api/v1/status (status {})", resp.status());
            }
        }

        Commands::Done => {
            let url = format!("{}/api/v1/done", base_url);
            let resp: DoneResponse = client.get(&url).send().await?.json().await?;
            println!("{}", if resp.done { "terminado" } else { "en curso" });
        }

        Commands::Sequential { app, out, inputs } => {
            let mr_app = app_by_name(&app).ok_or_else(|| {
                anyhow!("app desconocida: {app} (disponibles: {})", APP_NAMES.join(", "))
            })?;

            println!("Ejecutando {} en local sobre {} archivos", app, inputs.len());
            let keys = sequential::run_sequential(mr_app.as_ref(), &inputs, &out)?;
            println!("Listo: {} claves en {}", keys, out.display());
        }
    }

    Ok(())
}
