use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    Map,
    Reduce,
    Done,
}

/// Foto del estado del coordinador, para `GET /api/v1/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorStatus {
    pub phase: JobPhase,
    pub n_map: usize,
    pub n_reduce: usize,

    /// Tareas de la fase actual que todavía no se han confirmado
    pub remaining_tasks: usize,
    /// De esas, cuántas tienen un lease vigente
    pub leased_tasks: usize,

    pub started_at: DateTime<Utc>,
    pub reduce_started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
