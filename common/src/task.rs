use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de tarea: map sobre un archivo de entrada o reduce sobre una partición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Map,
    Reduce,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Map => write!(f, "map"),
            TaskKind::Reduce => write!(f, "reduce"),
        }
    }
}

/// Tarea entregada a un worker.
///
/// Lleva M y R siempre, porque el worker los necesita para calcular
/// los nombres de los shards en ambas fases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub kind: TaskKind,
    pub index: usize,
    /// Archivo de entrada (sólo en tareas map)
    pub input: Option<String>,
    pub n_map: usize,
    pub n_reduce: usize,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}
