//! Row handlers, one per upload file type.
//!
//! A handler declares its arity and runs the fixed validator order for its
//! file type, then the lookup and business transition. The first failed
//! check ends the row (fail-fast). Handlers never write task status; they
//! only return a [`RowOutcome`].

use async_trait::async_trait;
use caseflow_protocol::{AppConfig, FileType};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RowFailure, TaskError};
use crate::record::Record;
use crate::services::{CasePhaseService, IncidentService};
use crate::store::CaseStore;
use crate::validators::RowError;

/// Early return of a rejected row from a handler, like `?` for validations.
macro_rules! try_row {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => return Ok($crate::handlers::RowOutcome::Rejected(err)),
        }
    };
}
pub(crate) use try_row;

mod extend;
mod incident_creation;
mod reject;
mod status_change;

pub use extend::ValidityExtendHandler;
pub use incident_creation::IncidentCreationHandler;
pub use reject::IncidentRejectHandler;
pub use status_change::StatusChangeHandler;

/// Final state of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success,
    Rejected(RowError),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success)
    }
}

/// Task-level values some handlers need for every row.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    pub task_id: i64,
    pub file_upload_seq: i64,
    pub created_by: Option<String>,
    pub contact_number: Option<String>,
}

#[async_trait]
pub trait RowHandler: Send + Sync {
    fn file_type(&self) -> FileType;

    fn arity(&self) -> usize {
        self.file_type().arity()
    }

    /// Preconditions on the task itself, checked before the file is opened.
    fn check_task(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    /// Status description for a file that completed without row errors.
    fn completion_message(&self) -> &'static str;

    async fn process_row(&self, record: &Record, ctx: &TaskContext) -> Result<RowOutcome, RowFailure>;
}

/// Handlers keyed by file type.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<FileType, Arc<dyn RowHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one handler per supported file type.
    pub fn standard(
        config: &AppConfig,
        store: Arc<dyn CaseStore>,
        incidents: Arc<dyn IncidentService>,
        phases: Arc<dyn CasePhaseService>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StatusChangeHandler::discard(store.clone())));
        registry.register(Arc::new(StatusChangeHandler::hold(store.clone())));
        registry.register(Arc::new(IncidentRejectHandler::new(store.clone())));
        registry.register(Arc::new(ValidityExtendHandler::new(
            store,
            phases,
            config.limits.max_monitor_months,
            config.validation.extendable_phases.clone(),
        )));
        registry.register(Arc::new(IncidentCreationHandler::new(
            incidents,
            config.limits.incident_max_monitor_months,
            config.validation.drc_actions.clone(),
            config.validation.source_types.clone(),
        )));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn RowHandler>) {
        self.handlers.insert(handler.file_type(), handler);
    }

    pub fn get(&self, file_type: FileType) -> Option<Arc<dyn RowHandler>> {
        self.handlers.get(&file_type).cloned()
    }

    /// Resolve the raw `file_type` literal of a log entry.
    pub fn resolve(&self, raw_file_type: &str) -> Result<Arc<dyn RowHandler>, TaskError> {
        raw_file_type
            .parse::<FileType>()
            .ok()
            .and_then(|file_type| self.get(file_type))
            .ok_or_else(|| TaskError::UnsupportedFileType(raw_file_type.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fakes shared by the handler tests.

    use super::*;
    use crate::services::{IncidentPayload, PhaseLookup, ServiceError};
    use caseflow_protocol::CasePhase;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeIncidentService {
        pub calls: Mutex<Vec<IncidentPayload>>,
        pub fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl IncidentService for FakeIncidentService {
        async fn create_incident(
            &self,
            payload: &IncidentPayload,
        ) -> Result<serde_json::Value, ServiceError> {
            self.calls.lock().unwrap().push(payload.clone());
            match self.fail_with_status {
                Some(status) => Err(ServiceError::Status {
                    service: "incident service",
                    status,
                    body: "rejected".to_string(),
                }),
                None => Ok(serde_json::json!({ "status": "success" })),
            }
        }
    }

    /// Answers every lookup with the same reply.
    pub struct FixedPhaseService(pub PhaseLookup);

    impl FixedPhaseService {
        pub fn negotiation() -> Self {
            Self(PhaseLookup::Phase(CasePhase::Negotiation))
        }
    }

    #[async_trait]
    impl CasePhaseService for FixedPhaseService {
        async fn case_phase(&self, _case_status: &str) -> Result<PhaseLookup, ServiceError> {
            Ok(self.0.clone())
        }
    }

    pub fn record(fields: &[&str]) -> Record {
        Record {
            line: 1,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn rejected(message: &str) -> impl Fn(&RowOutcome) -> bool + '_ {
        move |outcome| matches!(outcome, RowOutcome::Rejected(err) if err.message == message)
    }
}
