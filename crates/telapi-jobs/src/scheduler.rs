//! Hourly scheduler
//!
//! `HourlyJob` is the periodic trigger for the expiry workflows. On each
//! invocation it submits exactly one dispatch request per scheduled workflow
//! name. Submissions are independent fan-out: a failed submission is logged
//! and the remaining names are still attempted.
//!
//! The scheduler itself carries no idempotence guard. It does not need one:
//! every scheduled workflow is idempotent, so invoking the scheduler more
//! than once per cadence only produces redundant no-op runs.

use crate::workflows::{EXPIRE_INITIATING_PHONE_CALLS, EXPIRE_IN_PROGRESS_PHONE_CALLS};
use std::sync::Arc;
use telapi_core::traits::JobQueue;
use tracing::{error, info, instrument};

/// Workflow names submitted on every scheduler invocation.
///
/// Adding a new transient state means adding its workflow to the registry and
/// its name here; the dispatch logic itself never changes.
pub const SCHEDULED_WORKFLOWS: &[&str] = &[
    EXPIRE_IN_PROGRESS_PHONE_CALLS,
    EXPIRE_INITIATING_PHONE_CALLS,
];

/// Periodic trigger that fans out workflow dispatch requests
pub struct HourlyJob {
    queue: Arc<dyn JobQueue>,
}

impl HourlyJob {
    /// Create a scheduler submitting to the given queue
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    /// Submit one dispatch request per scheduled workflow name.
    ///
    /// Returns the number of successful submissions; failures are logged and
    /// never block the remaining names.
    #[instrument(skip(self))]
    pub async fn perform(&self) -> usize {
        let mut submitted = 0;

        for name in SCHEDULED_WORKFLOWS {
            match self.queue.submit(name).await {
                Ok(()) => {
                    info!("Enqueued workflow {}", name);
                    submitted += 1;
                }
                Err(e) => {
                    error!("Failed to enqueue workflow {}: {}", name, e);
                }
            }
        }

        submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_workflows_cover_both_expiry_sweeps() {
        assert!(SCHEDULED_WORKFLOWS.contains(&EXPIRE_IN_PROGRESS_PHONE_CALLS));
        assert!(SCHEDULED_WORKFLOWS.contains(&EXPIRE_INITIATING_PHONE_CALLS));
        assert_eq!(SCHEDULED_WORKFLOWS.len(), 2);
    }
}
