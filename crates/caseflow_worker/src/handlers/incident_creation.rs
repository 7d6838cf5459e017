use async_trait::async_trait;
use caseflow_protocol::{DrcAction, FileType, SourceType};
use std::sync::Arc;
use tracing::debug;

use super::{try_row, RowHandler, RowOutcome, TaskContext};
use crate::error::{RowFailure, TaskError};
use crate::record::Record;
use crate::services::{IncidentPayload, IncidentService};
use crate::validators::{self, RowError, Validation};

/// Incident creation files: `account_no, drc_action, source_type, monitor_months`.
///
/// No local lookup: each valid row becomes one call to the incident service,
/// and that call decides the row's outcome.
pub struct IncidentCreationHandler {
    incidents: Arc<dyn IncidentService>,
    max_monitor_months: u32,
    drc_actions: Vec<DrcAction>,
    source_types: Vec<SourceType>,
}

impl IncidentCreationHandler {
    pub fn new(
        incidents: Arc<dyn IncidentService>,
        max_monitor_months: u32,
        drc_actions: Vec<DrcAction>,
        source_types: Vec<SourceType>,
    ) -> Self {
        Self {
            incidents,
            max_monitor_months,
            drc_actions,
            source_types,
        }
    }

    fn build_payload(&self, record: &Record, ctx: &TaskContext) -> Validation<IncidentPayload> {
        let account_num =
            validators::required_account(record.field(0), "Account number must be 10 digits")?;
        let drc_action = validators::drc_action(record.field(1), &self.drc_actions)?;
        let source_type = validators::source_type(record.field(2), &self.source_types)?;
        let monitor_months =
            validators::incident_monitor_months(record.field(3), self.max_monitor_months)?;
        let contact_number =
            validators::contact_number_for(drc_action, ctx.contact_number.as_deref())?;
        let created_by = ctx
            .created_by
            .clone()
            .ok_or_else(|| RowError::new("created_by", "Created by is missing"))?;

        Ok(IncidentPayload {
            account_num,
            drc_action,
            monitor_months,
            created_by,
            source_type,
            contact_number,
        })
    }
}

#[async_trait]
impl RowHandler for IncidentCreationHandler {
    fn file_type(&self) -> FileType {
        FileType::IncidentCreation
    }

    fn check_task(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        match ctx.created_by.as_deref().map(str::trim) {
            Some(created_by) if !created_by.is_empty() => Ok(()),
            _ => Err(TaskError::MissingTaskContext {
                task_id: ctx.task_id,
                field: "created_by",
            }),
        }
    }

    fn completion_message(&self) -> &'static str {
        "Incident creation completed successfully."
    }

    async fn process_row(&self, record: &Record, ctx: &TaskContext) -> Result<RowOutcome, RowFailure> {
        let payload = try_row!(self.build_payload(record, ctx));

        let reply = self.incidents.create_incident(&payload).await?;

        debug!(row = record.line, account = %payload.account_num, %reply, "Incident service accepted row");
        Ok(RowOutcome::Success)
    }
}
