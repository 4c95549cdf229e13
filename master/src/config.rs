use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;

use crate::task_store::DEFAULT_LEASE_TIMEOUT;

#[derive(Parser, Debug)]
#[command(name = "mrmaster")]
#[command(about = "Coordinador map/reduce: reparte tareas y reasigna las que vencen")]
pub struct Args {
    /// Archivos de entrada (o patrones glob); uno por tarea map
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    /// Número de tareas reduce (particiones de salida)
    #[arg(short = 'r', long, default_value_t = 10)]
    pub n_reduce: usize,

    /// Puerto HTTP
    #[arg(short, long, env = "MASTER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Segundos sin reporte tras los que una tarea se reasigna
    #[arg(long, default_value_t = DEFAULT_LEASE_TIMEOUT.as_secs())]
    pub lease_timeout_secs: u64,

    /// Segundos que el servidor sigue respondiendo `done` antes de apagarse
    #[arg(long, default_value_t = 3)]
    pub shutdown_grace_secs: u64,
}

/// Configuración ya validada del master.
#[derive(Debug, Clone)]
pub struct Config {
    pub files: Vec<String>,
    pub n_reduce: usize,
    pub port: u16,
    pub lease_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.n_reduce == 0 {
            bail!("--n-reduce debe ser al menos 1");
        }
        if args.lease_timeout_secs == 0 {
            bail!("--lease-timeout-secs debe ser al menos 1");
        }

        Ok(Self {
            files: expand_inputs(&args.inputs)?,
            n_reduce: args.n_reduce,
            port: args.port,
            lease_timeout: Duration::from_secs(args.lease_timeout_secs),
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        })
    }
}

/// Expande los patrones glob en orden; un argumento sin metacaracteres que
/// no existe se deja tal cual (fallará en el worker y se reintentará).
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let is_pattern = pattern.contains(['*', '?', '[']);
        if !is_pattern {
            files.push(pattern.clone());
            continue;
        }

        let mut matched: Vec<String> = Vec::new();
        for entry in glob(pattern).with_context(|| format!("patrón inválido: {pattern}"))? {
            let path = entry?;
            if path.is_file() {
                matched.push(path.to_string_lossy().to_string());
            }
        }
        if matched.is_empty() {
            bail!("el patrón {pattern} no encontró archivos");
        }
        matched.sort();
        files.extend(matched);
    }
    Ok(files)
}
