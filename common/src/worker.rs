use serde::{Deserialize, Serialize};

use crate::task::{Assignment, TaskKind};

pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentRequest {
    /// Sólo se usa para los logs del master
    pub worker_id: WorkerId,
}

/// `task == None` significa "no hay tarea ahora, reintentar", no "job terminado".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentResponse {
    pub task: Option<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteRequest {
    pub kind: TaskKind,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoneResponse {
    pub done: bool,
}
