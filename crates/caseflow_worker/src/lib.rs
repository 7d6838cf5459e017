//! Caseflow upload worker.
//!
//! Turns one uploaded CSV into case and incident updates:
//! record parser -> field validators -> query builder -> row handler ->
//! batch aggregator -> completion reporter. The [`runner::TaskRunner`] ties
//! these to the task queue.

pub mod batch;
pub mod error;
pub mod files;
pub mod handlers;
pub mod query;
pub mod record;
pub mod reporter;
pub mod runner;
pub mod services;
pub mod store;
pub mod validators;

pub use batch::{run_batch, BatchSummary};
pub use error::{RowFailure, TaskError};
pub use handlers::{HandlerRegistry, RowHandler, RowOutcome, TaskContext};
pub use reporter::CompletionReporter;
pub use runner::{RunSummary, TaskRunner};
pub use services::{CasePhaseService, IncidentService, ServiceError};
pub use store::CaseStore;
pub use validators::{RowError, Validation};
