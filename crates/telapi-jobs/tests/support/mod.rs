//! Shared test doubles for the job subsystem tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use telapi_core::{
    models::{CallState, PhoneCall},
    traits::{JobQueue, PhoneCallRepository},
    AppError, AppResult,
};

/// In-memory phone call store
///
/// Supports two fault knobs: `fail_transition_for` makes a specific call's
/// transition return a store error, and `advance_on_find` flips a call to a
/// new state right after the staleness query runs, simulating the live
/// call-handling path racing the sweep.
#[derive(Default)]
pub struct InMemoryPhoneCallRepository {
    calls: Mutex<Vec<PhoneCall>>,
    next_id: AtomicI64,
    failing_ids: Mutex<HashSet<i64>>,
    advance_on_find: Mutex<Option<(i64, CallState)>>,
}

impl InMemoryPhoneCallRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Seed a call, assigning its surrogate id
    pub fn insert(&self, mut call: PhoneCall) -> PhoneCall {
        call.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call.clone());
        call
    }

    /// Make `transition_state` for this call fail with a store error
    pub fn fail_transition_for(&self, id: i64) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    /// Flip the call to `state` immediately after the next staleness query
    pub fn advance_on_find(&self, id: i64, state: CallState) {
        *self.advance_on_find.lock().unwrap() = Some((id, state));
    }

    pub fn get(&self, sid: &str) -> Option<PhoneCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.sid == sid)
            .cloned()
    }
}

#[async_trait]
impl PhoneCallRepository for InMemoryPhoneCallRepository {
    async fn create(&self, call: &PhoneCall) -> AppResult<PhoneCall> {
        Ok(self.insert(call.clone()))
    }

    async fn find_by_sid(&self, sid: &str) -> AppResult<Option<PhoneCall>> {
        Ok(self.get(sid))
    }

    async fn list_by_account(
        &self,
        account_sid: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PhoneCall>> {
        let mut calls: Vec<PhoneCall> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.account_sid == account_sid)
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(calls
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_stale(
        &self,
        state: CallState,
        older_than: Duration,
    ) -> AppResult<Vec<PhoneCall>> {
        let cutoff = Utc::now() - older_than;
        let stale: Vec<PhoneCall> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.state == state && c.date_updated <= cutoff)
            .cloned()
            .collect();

        // Simulate a concurrent transition landing between query and sweep
        if let Some((id, new_state)) = self.advance_on_find.lock().unwrap().take() {
            let mut calls = self.calls.lock().unwrap();
            if let Some(call) = calls.iter_mut().find(|c| c.id == id) {
                call.state = new_state;
                call.date_updated = Utc::now();
            }
        }

        Ok(stale)
    }

    async fn transition_state(
        &self,
        id: i64,
        expected_state: CallState,
        new_state: CallState,
        new_date_updated: DateTime<Utc>,
    ) -> AppResult<bool> {
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(AppError::Database("simulated store failure".to_string()));
        }

        let mut calls = self.calls.lock().unwrap();
        match calls
            .iter_mut()
            .find(|c| c.id == id && c.state == expected_state)
        {
            Some(call) => {
                call.state = new_state;
                call.date_updated = new_date_updated;
                call.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_in_state(&self, state: CallState) -> AppResult<i64> {
        Ok(self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.state == state)
            .count() as i64)
    }
}

/// Job queue that records submissions and can fail selected names
#[derive(Default)]
pub struct RecordingJobQueue {
    submissions: Mutex<Vec<String>>,
    failing_names: Mutex<HashSet<String>>,
}

impl RecordingJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_submissions_for(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn submit(&self, workflow_name: &str) -> AppResult<()> {
        if self.failing_names.lock().unwrap().contains(workflow_name) {
            return Err(AppError::Queue(format!(
                "simulated submission failure for {}",
                workflow_name
            )));
        }
        self.submissions
            .lock()
            .unwrap()
            .push(workflow_name.to_string());
        Ok(())
    }
}

/// Build a call in the given state whose `date_updated` lies `age` in the past
pub fn call_aged(state: CallState, age: Duration) -> PhoneCall {
    let mut call = PhoneCall::new(
        "AC00000000000000000000000000000001".to_string(),
        "+14155551234".to_string(),
        "+14155556789".to_string(),
    );
    call.state = state;
    call.date_updated = Utc::now() - age;
    call
}
