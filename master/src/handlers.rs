use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{
    CoordinatorStatus, DoneResponse, TaskAssignmentRequest, TaskAssignmentResponse,
    TaskCompleteRequest, TaskCompleteResponse,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::coordinator::CompletionOutcome;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .route("/api/v1/done", get(query_done))
        .route("/api/v1/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// RequestTask: entrega la siguiente tarea elegible, o ninguna
async fn assign_task(
    State(state): State<AppState>,
    Json(req): Json<TaskAssignmentRequest>,
) -> Result<Json<TaskAssignmentResponse>, StatusCode> {
    let task = {
        let mut coordinator = state.coordinator.lock().map_err(|_| {
            error!("mutex del coordinador envenenado");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        coordinator.assign(Instant::now())
    };

    match &task {
        Some(t) => info!("asignando tarea {} al worker {}", t, req.worker_id),
        None => debug!("worker {} pidió tarea pero no hay disponibles", req.worker_id),
    }

    Ok(Json(TaskAssignmentResponse { task }))
}

// SubmitTask: el worker terminó una tarea. Duplicados y reportes de otra
// fase responden igual que un éxito.
async fn complete_task(
    State(state): State<AppState>,
    Json(req): Json<TaskCompleteRequest>,
) -> Result<Json<TaskCompleteResponse>, (StatusCode, String)> {
    let outcome = {
        let mut coordinator = state.coordinator.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "mutex del coordinador envenenado".to_string(),
            )
        })?;
        coordinator.complete(req.kind, req.index)
    };

    match outcome {
        Ok(CompletionOutcome::Retired) => info!("tarea {} #{} completada", req.kind, req.index),
        Ok(CompletionOutcome::AlreadyRetired) => {
            debug!("tarea {} #{} ya estaba completada", req.kind, req.index)
        }
        Ok(CompletionOutcome::IgnoredStalePhase) => {}
        Err(e) => {
            error!("error al completar {} #{}: {}", req.kind, req.index, e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    Ok(Json(TaskCompleteResponse { ok: true }))
}

// QueryDone
async fn query_done(State(state): State<AppState>) -> Result<Json<DoneResponse>, StatusCode> {
    let coordinator = state
        .coordinator
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(DoneResponse {
        done: coordinator.is_done(),
    }))
}

async fn get_status(State(state): State<AppState>) -> Result<Json<CoordinatorStatus>, StatusCode> {
    let coordinator = state
        .coordinator
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(coordinator.status(Instant::now())))
}
