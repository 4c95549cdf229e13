// master/src/state.rs

use std::sync::{Arc, Mutex};

use crate::coordinator::Coordinator;

/// Estado compartido por todos los handlers. El coordinador entero va
/// detrás de un solo mutex: cada request lo toma una vez y nunca lo
/// sostiene a través de un `.await`.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Mutex<Coordinator>>,
}

impl AppState {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
        }
    }
}
