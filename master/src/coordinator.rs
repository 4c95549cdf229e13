use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::{Assignment, CoordinatorStatus, JobPhase, TaskKind};
use tracing::{debug, info};

use crate::task_store::{TaskStore, TaskStoreError};

/// Qué pasó con un reporte de finalización. En el protocolo todas las
/// variantes se responden igual; sólo sirve para logs y tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Retired,
    /// Otro worker ya la había completado (asignación duplicada)
    AlreadyRetired,
    /// Reporte de una fase que no es la actual
    IgnoredStalePhase,
}

/// Dueño único de la tabla de tareas y de la transición map -> reduce.
#[derive(Debug)]
pub struct Coordinator {
    store: TaskStore,
    map_phase_complete: bool,
    n_map: usize,
    n_reduce: usize,

    started_at: DateTime<Utc>,
    reduce_started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Coordinator {
    /// Crea una tarea map por archivo de entrada. M = `files.len()`.
    pub fn new(
        files: Vec<String>,
        n_reduce: usize,
        lease_timeout: Duration,
    ) -> Result<Self, TaskStoreError> {
        let mut coordinator = Self {
            store: TaskStore::new(lease_timeout),
            map_phase_complete: false,
            n_map: files.len(),
            n_reduce,
            started_at: Utc::now(),
            reduce_started_at: None,
            finished_at: None,
        };

        for (index, file) in files.into_iter().enumerate() {
            coordinator.store.add_map_task(index, file)?;
        }

        // sin entradas no hay nada que mapear: pasamos directo a reduce
        if coordinator.store.is_empty() {
            coordinator.start_reduce_phase()?;
        }

        Ok(coordinator)
    }

    pub fn n_map(&self) -> usize {
        self.n_map
    }

    pub fn n_reduce(&self) -> usize {
        self.n_reduce
    }

    pub fn phase(&self) -> JobPhase {
        if !self.map_phase_complete {
            JobPhase::Map
        } else if self.store.is_empty() {
            JobPhase::Done
        } else {
            JobPhase::Reduce
        }
    }

    /// `None` = no hay tarea disponible ahora (no significa que el job terminó).
    pub fn assign(&mut self, now: Instant) -> Option<Assignment> {
        let leased = self.store.get_assignment(now)?;

        if leased.reissued {
            info!(
                "lease vencido, reasignando tarea {} #{}",
                leased.id.kind, leased.id.index
            );
        }

        Some(Assignment {
            kind: leased.id.kind,
            index: leased.id.index,
            input: leased.input,
            n_map: self.n_map,
            n_reduce: self.n_reduce,
        })
    }

    /// Procesa un reporte de finalización.
    ///
    /// Los reportes de la fase equivocada se ignoran a propósito: son
    /// stragglers de map que llegan tarde o reportes imposibles de reduce.
    pub fn complete(
        &mut self,
        kind: TaskKind,
        index: usize,
    ) -> Result<CompletionOutcome, TaskStoreError> {
        if !self.map_phase_complete {
            if kind != TaskKind::Map {
                debug!("ignorando reduce #{} reportado durante la fase map", index);
                return Ok(CompletionOutcome::IgnoredStalePhase);
            }

            let removed = self.store.remove_task(TaskKind::Map, index);
            if self.store.is_empty() {
                self.start_reduce_phase()?;
            }
            return Ok(Self::outcome(removed));
        }

        if kind == TaskKind::Map {
            debug!("ignorando map #{} tardío: la fase map ya terminó", index);
            return Ok(CompletionOutcome::IgnoredStalePhase);
        }

        let removed = self.store.remove_task(TaskKind::Reduce, index);
        if removed && self.store.is_empty() {
            self.finished_at = Some(Utc::now());
            info!("job terminado: {} particiones de salida completas", self.n_reduce);
        }
        Ok(Self::outcome(removed))
    }

    fn outcome(removed: bool) -> CompletionOutcome {
        if removed {
            CompletionOutcome::Retired
        } else {
            CompletionOutcome::AlreadyRetired
        }
    }

    /// Crea las R tareas reduce. Sólo se llama una vez: lo protege el flag.
    fn start_reduce_phase(&mut self) -> Result<(), TaskStoreError> {
        self.map_phase_complete = true;
        for index in 0..self.n_reduce {
            self.store.add_reduce_task(index)?;
        }
        self.reduce_started_at = Some(Utc::now());
        info!(
            "fase map completa ({} tareas), creadas {} tareas reduce",
            self.n_map, self.n_reduce
        );
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.map_phase_complete && self.store.is_empty()
    }

    pub fn status(&self, now: Instant) -> CoordinatorStatus {
        CoordinatorStatus {
            phase: self.phase(),
            n_map: self.n_map,
            n_reduce: self.n_reduce,
            remaining_tasks: self.store.len(),
            leased_tasks: self.store.leased_count(now),
            started_at: self.started_at,
            reduce_started_at: self.reduce_started_at,
            finished_at: self.finished_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn coordinator(n_map: usize, n_reduce: usize) -> Coordinator {
        let files = (0..n_map).map(|i| format!("pg-{}.txt", i)).collect();
        Coordinator::new(files, n_reduce, TIMEOUT).unwrap()
    }

    /// Pide tareas hasta vaciar lo asignable en `now`.
    fn drain(c: &mut Coordinator, now: Instant) -> Vec<Assignment> {
        std::iter::from_fn(|| c.assign(now)).collect()
    }

    #[test]
    fn is_done_es_false_al_empezar() {
        let c = coordinator(2, 3);
        assert!(!c.is_done());
        assert_eq!(c.phase(), JobPhase::Map);
    }

    #[test]
    fn assign_lleva_m_y_r_y_la_entrada() {
        let mut c = coordinator(2, 3);

        let a = c.assign(Instant::now()).unwrap();

        assert_eq!(a.kind, TaskKind::Map);
        assert_eq!(a.input.as_deref(), Some("pg-0.txt"));
        assert_eq!((a.n_map, a.n_reduce), (2, 3));
    }

    #[test]
    fn no_hay_reduce_mientras_quede_algun_map() {
        let mut c = coordinator(2, 2);
        let now = Instant::now();

        let maps = drain(&mut c, now);
        assert_eq!(maps.len(), 2);
        assert!(maps.iter().all(|a| a.kind == TaskKind::Map));

        c.complete(TaskKind::Map, 0).unwrap();
        // map 1 sigue en vuelo: no aparece ningún reduce
        assert!(c.assign(now).is_none());
        assert_eq!(c.phase(), JobPhase::Map);

        // y el map 1 vencido vuelve a salir como map
        let later = now + TIMEOUT * 2;
        let again = c.assign(later).unwrap();
        assert_eq!((again.kind, again.index), (TaskKind::Map, 1));
    }

    #[test]
    fn al_terminar_los_maps_aparecen_exactamente_r_reduces() {
        let mut c = coordinator(2, 3);
        let now = Instant::now();
        drain(&mut c, now);

        c.complete(TaskKind::Map, 0).unwrap();
        c.complete(TaskKind::Map, 1).unwrap();

        assert_eq!(c.phase(), JobPhase::Reduce);
        let reduces = drain(&mut c, now);
        let mut idx: Vec<usize> = reduces.iter().map(|a| a.index).collect();
        idx.sort();
        assert_eq!(idx, vec![0, 1, 2]);
        assert!(reduces.iter().all(|a| a.kind == TaskKind::Reduce && a.input.is_none()));
    }

    #[test]
    fn reportes_duplicados_no_crean_reduces_de_nuevo() {
        let mut c = coordinator(1, 2);

        assert_eq!(c.complete(TaskKind::Map, 0).unwrap(), CompletionOutcome::Retired);
        assert_eq!(
            c.complete(TaskKind::Map, 0).unwrap(),
            CompletionOutcome::IgnoredStalePhase
        );

        assert_eq!(c.status(Instant::now()).remaining_tasks, 2);
    }

    #[test]
    fn reduce_reportado_en_fase_map_se_ignora() {
        let mut c = coordinator(1, 1);

        assert_eq!(
            c.complete(TaskKind::Reduce, 0).unwrap(),
            CompletionOutcome::IgnoredStalePhase
        );
        assert_eq!(c.phase(), JobPhase::Map);
    }

    #[test]
    fn reduce_duplicado_es_no_op() {
        let mut c = coordinator(1, 2);
        c.complete(TaskKind::Map, 0).unwrap();

        assert_eq!(c.complete(TaskKind::Reduce, 1).unwrap(), CompletionOutcome::Retired);
        assert_eq!(
            c.complete(TaskKind::Reduce, 1).unwrap(),
            CompletionOutcome::AlreadyRetired
        );
        assert!(!c.is_done());
    }

    #[test]
    fn is_done_solo_tras_retirar_todos_los_reduces() {
        let mut c = coordinator(2, 2);
        c.complete(TaskKind::Map, 0).unwrap();
        c.complete(TaskKind::Map, 1).unwrap();
        assert!(!c.is_done());

        c.complete(TaskKind::Reduce, 0).unwrap();
        assert!(!c.is_done());
        c.complete(TaskKind::Reduce, 1).unwrap();

        assert!(c.is_done());
        assert_eq!(c.phase(), JobPhase::Done);
        assert!(c.assign(Instant::now()).is_none());
        assert!(c.status(Instant::now()).finished_at.is_some());
    }

    #[test]
    fn sin_entradas_arranca_en_fase_reduce() {
        let c = coordinator(0, 2);
        assert_eq!(c.phase(), JobPhase::Reduce);
        assert_eq!(c.status(Instant::now()).remaining_tasks, 2);
    }

    /// Muchos hilos reportando los mismos maps a la vez: la tanda de
    /// reduces se crea una sola vez.
    #[test]
    fn reduces_se_crean_una_vez_con_reportes_concurrentes() {
        let n_map = 8;
        let n_reduce = 5;
        let c = Arc::new(Mutex::new(coordinator(n_map, n_reduce)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = c.clone();
                thread::spawn(move || {
                    for i in 0..n_map {
                        c.lock().unwrap().complete(TaskKind::Map, i).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut c = c.lock().unwrap();
        assert_eq!(c.status(Instant::now()).remaining_tasks, n_reduce);
        let now = Instant::now();
        let reduces = drain(&mut c, now);
        assert_eq!(reduces.len(), n_reduce);
    }

    #[test]
    fn status_cuenta_leases_vigentes() {
        let mut c = coordinator(3, 1);
        let now = Instant::now();
        c.assign(now).unwrap();

        let st = c.status(now);
        assert_eq!(st.remaining_tasks, 3);
        assert_eq!(st.leased_tasks, 1);
        assert_eq!(c.status(now + TIMEOUT * 2).leased_tasks, 0);
    }
}
