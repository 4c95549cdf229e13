use std::{io, path::PathBuf};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Fallos de un intento de ejecución de tarea. Ninguno se reporta al
/// coordinador: la tarea queda en su tabla y el lease termina expirando.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("error de E/S en {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("línea inválida en {}:{line}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("falta el shard intermedio {}", .0.display())]
    MissingShard(PathBuf),

    #[error("la tarea map {0} no trae archivo de entrada")]
    MissingInput(usize),

    #[error("n_reduce debe ser mayor que cero")]
    NoPartitions,
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
