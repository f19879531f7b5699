//! Expiry workflows
//!
//! Each expiry workflow targets exactly one transient call state and a
//! configurable staleness threshold. Calls that sat in the target state past
//! the threshold are transitioned to `expired` through the repository's
//! conditional update, so a call that the live call-handling path advanced
//! concurrently is skipped rather than overwritten.
//!
//! Running the same workflow twice in a row is safe: the second run finds no
//! qualifying records, or only newly-qualified ones.

use super::{EXPIRE_INITIATING_PHONE_CALLS, EXPIRE_IN_PROGRESS_PHONE_CALLS};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use telapi_core::{
    config::ExpiryConfig,
    models::CallState,
    traits::{PhoneCallRepository, Workflow, WorkflowReport},
    AppError, AppResult,
};
use tracing::{debug, info, instrument, warn};

/// Expiry workflow parameterized by one target transient state
pub struct ExpirePhoneCalls<R> {
    repo: Arc<R>,
    target_state: CallState,
    threshold: Duration,
    name: &'static str,
}

impl<R: PhoneCallRepository> ExpirePhoneCalls<R> {
    /// Workflow sweeping calls stuck in `initiating`
    pub fn initiating(repo: Arc<R>, config: &ExpiryConfig) -> Self {
        Self {
            repo,
            target_state: CallState::Initiating,
            threshold: Duration::seconds(config.initiating_threshold_secs),
            name: EXPIRE_INITIATING_PHONE_CALLS,
        }
    }

    /// Workflow sweeping calls stuck in `in_progress`
    pub fn in_progress(repo: Arc<R>, config: &ExpiryConfig) -> Self {
        Self {
            repo,
            target_state: CallState::InProgress,
            threshold: Duration::seconds(config.in_progress_threshold_secs),
            name: EXPIRE_IN_PROGRESS_PHONE_CALLS,
        }
    }

    /// The single transient state this workflow may move calls out of
    pub fn target_state(&self) -> CallState {
        self.target_state
    }

    /// Configured staleness threshold
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

#[async_trait]
impl<R: PhoneCallRepository + 'static> Workflow for ExpirePhoneCalls<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    #[instrument(skip(self), fields(workflow = self.name))]
    async fn run(&self) -> AppResult<WorkflowReport> {
        let stale = self
            .repo
            .find_stale(self.target_state, self.threshold)
            .await?;

        let mut report = WorkflowReport {
            examined: stale.len(),
            ..Default::default()
        };

        for call in &stale {
            let now = Utc::now();
            match self
                .repo
                .transition_state(call.id, self.target_state, CallState::Expired, now)
                .await
            {
                Ok(true) => {
                    info!("Expired call {} stuck in {}", call.sid, self.target_state);
                    report.expired += 1;
                }
                Ok(false) => {
                    // The call left the target state while we were sweeping.
                    // It is no longer stale; nothing to do.
                    debug!("Skipping call {}: state changed concurrently", call.sid);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to expire call {}: {}", call.sid, e);
                    report.failed += 1;
                }
            }
        }

        info!("{} finished: {}", self.name, report);

        if report.failed > 0 {
            // Already-applied transitions are kept; the enclosing job fails
            // so the infrastructure's retry policy can pick up the rest.
            return Err(AppError::Workflow(format!(
                "{}: {} of {} transitions failed",
                self.name, report.failed, report.examined
            )));
        }

        Ok(report)
    }
}
