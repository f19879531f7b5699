//! Workflow dispatcher
//!
//! `ExecuteWorkflowJob` is the generic executor behind every dispatch
//! request: given a workflow name it resolves the catalog entry and runs the
//! workflow synchronously within the job's execution context. Workflow
//! failures propagate as job failures so the job infrastructure may apply its
//! retry policy; an unresolvable name is fatal and never retried.

use crate::workflows::WorkflowRegistry;
use std::sync::Arc;
use telapi_core::{traits::WorkflowReport, AppError, AppResult};
use tracing::{error, info, instrument, warn};

/// Generic named-workflow executor
pub struct ExecuteWorkflowJob {
    registry: Arc<WorkflowRegistry>,
}

impl ExecuteWorkflowJob {
    /// Create a dispatcher over the given catalog
    pub fn new(registry: Arc<WorkflowRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve and run the named workflow
    #[instrument(skip(self))]
    pub async fn execute(&self, workflow_name: &str) -> AppResult<WorkflowReport> {
        let workflow = self.registry.resolve(workflow_name).ok_or_else(|| {
            error!(
                "Dispatched workflow {} is not registered; check deployment",
                workflow_name
            );
            AppError::UnknownWorkflow(workflow_name.to_string())
        })?;

        let report = workflow.run().await.map_err(|e| {
            warn!("Workflow {} failed: {}", workflow_name, e);
            e
        })?;

        info!("Workflow {} completed: {}", workflow_name, report);
        Ok(report)
    }
}
