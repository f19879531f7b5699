//! Workflow catalog
//!
//! Workflows are stateless batch units registered under fixed names. The
//! registry is built once at process startup and validated for completeness
//! before the scheduler starts; an unregistered name reaching the dispatcher
//! is a deployment bug.

pub mod expire_phone_calls;

pub use expire_phone_calls::ExpirePhoneCalls;

use std::collections::HashMap;
use std::sync::Arc;
use telapi_core::{
    config::ExpiryConfig,
    traits::{PhoneCallRepository, Workflow},
    AppError, AppResult,
};
use tracing::info;

/// Name of the workflow that sweeps stale `initiating` calls
pub const EXPIRE_INITIATING_PHONE_CALLS: &str = "ExpireInitiatingPhoneCalls";

/// Name of the workflow that sweeps stale `in_progress` calls
pub const EXPIRE_IN_PROGRESS_PHONE_CALLS: &str = "ExpireInProgressPhoneCalls";

/// Fixed catalog mapping workflow names to executable workflows
#[derive(Default)]
pub struct WorkflowRegistry {
    workflows: HashMap<&'static str, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            workflows: HashMap::new(),
        }
    }

    /// Build the standard catalog with both expiry workflows
    pub fn standard<R: PhoneCallRepository + 'static>(
        repo: Arc<R>,
        expiry: &ExpiryConfig,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ExpirePhoneCalls::initiating(repo.clone(), expiry)));
        registry.register(Arc::new(ExpirePhoneCalls::in_progress(repo, expiry)));
        registry
    }

    /// Register a workflow under its own name
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) {
        info!("Registering workflow {}", workflow.name());
        self.workflows.insert(workflow.name(), workflow);
    }

    /// Resolve a name to its workflow
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Workflow>> {
        self.workflows.get(name).cloned()
    }

    /// Registered workflow names
    pub fn names(&self) -> Vec<&'static str> {
        self.workflows.keys().copied().collect()
    }

    /// Verify that every scheduled name resolves.
    ///
    /// Run at process initialization so a missing registration fails the
    /// deploy instead of surfacing as hourly `UnknownWorkflow` job failures.
    pub fn verify_scheduled(&self, scheduled: &[&str]) -> AppResult<()> {
        for name in scheduled {
            if !self.workflows.contains_key(name) {
                return Err(AppError::UnknownWorkflow((*name).to_string()));
            }
        }
        Ok(())
    }
}
