pub mod app;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod job;
pub mod partition;
pub mod sequential;
pub mod task;
pub mod wordcount;
pub mod worker;

pub use app::{app_by_name, KeyValue, MapReduceApp, APP_NAMES};
pub use error::{EngineError, EngineResult};
pub use job::{CoordinatorStatus, JobPhase};
pub use task::{Assignment, TaskKind};
pub use worker::{
    DoneResponse, TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest,
    TaskCompleteResponse, WorkerId,
};
