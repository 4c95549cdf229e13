// master/src/task_store.rs

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use common::TaskKind;
use thiserror::Error;

/// Lease por defecto: si una tarea lleva más que esto asignada, se reasigna.
pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskStoreError {
    /// Error de programación: nunca debería pasar en operación normal.
    #[error("la tarea {kind} #{index} ya existe")]
    Duplicate { kind: TaskKind, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId {
    pub kind: TaskKind,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lease {
    Unassigned,
    Leased { issued_at: Instant },
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    /// Archivo de entrada; `None` en tareas reduce
    pub input: Option<String>,
    pub lease: Lease,
}

/// Un lease vence cuando pasó estrictamente más que `timeout` desde su emisión.
fn expired(lease: Lease, now: Instant, timeout: Duration) -> bool {
    match lease {
        Lease::Unassigned => false,
        Lease::Leased { issued_at } => now.saturating_duration_since(issued_at) > timeout,
    }
}

/// Lo que `get_assignment` devuelve de una tarea recién arrendada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeasedTask {
    pub id: TaskId,
    pub input: Option<String>,
    /// true si la tarea ya tenía un lease vencido (worker caído o lento)
    pub reissued: bool,
}

/// Tabla en memoria de tareas pendientes.
///
/// Una tarea vive aquí desde que se crea hasta que se confirma su
/// finalización; borrarla es la única forma de que deje de asignarse.
#[derive(Debug)]
pub struct TaskStore {
    tasks: BTreeMap<TaskId, Task>,
    lease_timeout: Duration,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE_TIMEOUT)
    }
}

impl TaskStore {
    pub fn new(lease_timeout: Duration) -> Self {
        Self {
            tasks: BTreeMap::new(),
            lease_timeout,
        }
    }

    pub fn add_map_task(&mut self, index: usize, input: String) -> Result<(), TaskStoreError> {
        self.insert(TaskKind::Map, index, Some(input))
    }

    pub fn add_reduce_task(&mut self, index: usize) -> Result<(), TaskStoreError> {
        self.insert(TaskKind::Reduce, index, None)
    }

    fn insert(
        &mut self,
        kind: TaskKind,
        index: usize,
        input: Option<String>,
    ) -> Result<(), TaskStoreError> {
        let id = TaskId { kind, index };
        if self.tasks.contains_key(&id) {
            return Err(TaskStoreError::Duplicate { kind, index });
        }
        self.tasks.insert(
            id,
            Task {
                id,
                input,
                lease: Lease::Unassigned,
            },
        );
        Ok(())
    }

    /// Devuelve la primera tarea sin asignar o con lease vencido y la
    /// marca como asignada en `now`.
    ///
    /// `None` si la tabla está vacía o si todo está en vuelo con lease vigente.
    pub fn get_assignment(&mut self, now: Instant) -> Option<LeasedTask> {
        let lease_timeout = self.lease_timeout;
        let task = self
            .tasks
            .values_mut()
            .find(|t| t.lease == Lease::Unassigned || expired(t.lease, now, lease_timeout))?;

        let reissued = matches!(task.lease, Lease::Leased { .. });
        task.lease = Lease::Leased { issued_at: now };

        Some(LeasedTask {
            id: task.id,
            input: task.input.clone(),
            reissued,
        })
    }

    /// Borra la tarea si existe. Idempotente: borrar algo que ya no está
    /// no es un error. Devuelve si realmente se borró algo.
    pub fn remove_task(&mut self, kind: TaskKind, index: usize) -> bool {
        self.tasks.remove(&TaskId { kind, index }).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Cuántas tareas tienen un lease todavía vigente en `now`.
    pub fn leased_count(&self, now: Instant) -> usize {
        self.tasks
            .values()
            .filter(|t| {
                matches!(t.lease, Lease::Leased { .. }) && !expired(t.lease, now, self.lease_timeout)
            })
            .count()
    }
}
