//! Common traits for repositories, job queues, and workflows
//!
//! Defines the seams between the call store, the job infrastructure, and the
//! batch workflows that sweep stale calls.

use crate::error::AppError;
use crate::models::{CallState, PhoneCall};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Phone call repository trait
///
/// The store is shared between the live call-handling path and the expiry
/// workflows. The only mutation discipline required of implementations is the
/// per-record conditional transition: no store-wide locking.
#[async_trait]
pub trait PhoneCallRepository: Send + Sync {
    /// Persist a new call and return it with its assigned surrogate id
    async fn create(&self, call: &PhoneCall) -> Result<PhoneCall, AppError>;

    /// Find a call by its external SID
    async fn find_by_sid(&self, sid: &str) -> Result<Option<PhoneCall>, AppError>;

    /// List calls belonging to an account, newest first
    async fn list_by_account(
        &self,
        account_sid: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PhoneCall>, AppError>;

    /// Find calls sitting in `state` whose `date_updated` is older than
    /// now minus `older_than`
    async fn find_stale(
        &self,
        state: CallState,
        older_than: Duration,
    ) -> Result<Vec<PhoneCall>, AppError>;

    /// Conditionally transition a call's state.
    ///
    /// The update applies only while the call is still in `expected_state`,
    /// refreshing `date_updated` to `new_date_updated`. Returns `Ok(false)`
    /// when zero rows matched: the call was concurrently advanced by another
    /// path and must be skipped, not overwritten.
    async fn transition_state(
        &self,
        id: i64,
        expected_state: CallState,
        new_state: CallState,
        new_date_updated: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Count calls currently in the given state
    async fn count_in_state(&self, state: CallState) -> Result<i64, AppError>;
}

/// Asynchronous job submission interface
///
/// Provided by the job infrastructure; delivery is at-least-once with no
/// ordering guarantee between submissions.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a dispatch request for the named workflow
    async fn submit(&self, workflow_name: &str) -> Result<(), AppError>;
}

/// A named, stateless unit of batch logic invoked through the dispatcher
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Registered name the dispatcher resolves
    fn name(&self) -> &'static str;

    /// Run the workflow to completion
    async fn run(&self) -> Result<WorkflowReport, AppError>;
}

/// Outcome of one workflow run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowReport {
    /// Records matched by the staleness query
    pub examined: usize,
    /// Transitions applied
    pub expired: usize,
    /// Conditional updates that matched zero rows (concurrent transition)
    pub skipped: usize,
    /// Records whose transition hit a store failure
    pub failed: usize,
}

impl fmt::Display for WorkflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined={} expired={} skipped={} failed={}",
            self.examined, self.expired, self.skipped, self.failed
        )
    }
}
