//! Behavior tests for the expiry workflows
//!
//! Exercised against the in-memory repository: staleness selection,
//! idempotence, concurrent-transition skips, and batch error aggregation.

mod support;

use chrono::{Duration, Utc};
use std::sync::Arc;
use support::{call_aged, InMemoryPhoneCallRepository};
use telapi_core::{
    config::ExpiryConfig,
    models::CallState,
    traits::Workflow,
    AppError,
};
use telapi_jobs::ExpirePhoneCalls;

fn one_hour_thresholds() -> ExpiryConfig {
    ExpiryConfig {
        initiating_threshold_secs: 3600,
        in_progress_threshold_secs: 3600,
    }
}

#[tokio::test]
async fn stale_initiating_calls_are_expired() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let stale = repo.insert(call_aged(CallState::Initiating, Duration::hours(2)));
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let report = workflow.run().await.unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(report.expired, 1);
    assert_eq!(repo.get(&stale.sid).unwrap().state, CallState::Expired);
}

#[tokio::test]
async fn fresh_calls_are_left_alone() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let fresh = repo.insert(call_aged(CallState::Initiating, Duration::minutes(10)));
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let report = workflow.run().await.unwrap();

    assert_eq!(report.examined, 0);
    assert_eq!(repo.get(&fresh.sid).unwrap().state, CallState::Initiating);
}

#[tokio::test]
async fn workflows_only_touch_their_own_target_state() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let in_progress = repo.insert(call_aged(CallState::InProgress, Duration::hours(2)));
    let ringing = repo.insert(call_aged(CallState::Ringing, Duration::hours(2)));
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let report = workflow.run().await.unwrap();

    assert_eq!(report.examined, 0);
    assert_eq!(repo.get(&in_progress.sid).unwrap().state, CallState::InProgress);
    assert_eq!(repo.get(&ringing.sid).unwrap().state, CallState::Ringing);
}

#[tokio::test]
async fn second_run_finds_nothing_to_do() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let stale = repo.insert(call_aged(CallState::InProgress, Duration::hours(2)));
    let workflow = ExpirePhoneCalls::in_progress(repo.clone(), &one_hour_thresholds());

    let first = workflow.run().await.unwrap();
    assert_eq!(first.expired, 1);
    let expired_at = repo.get(&stale.sid).unwrap().date_updated;

    let second = workflow.run().await.unwrap();
    assert_eq!(second.examined, 0);
    assert_eq!(second.expired, 0);
    // The record was not touched again
    assert_eq!(repo.get(&stale.sid).unwrap().date_updated, expired_at);
    assert_eq!(repo.get(&stale.sid).unwrap().state, CallState::Expired);
}

#[tokio::test]
async fn concurrently_advanced_call_is_skipped_not_overwritten() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let racing = repo.insert(call_aged(CallState::Initiating, Duration::hours(2)));
    // The live call-handling path answers the call between the staleness
    // query and the sweep
    repo.advance_on_find(racing.id, CallState::InProgress);
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let report = workflow.run().await.unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(report.expired, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(repo.get(&racing.sid).unwrap().state, CallState::InProgress);
}

#[tokio::test]
async fn one_failing_record_does_not_abort_the_batch() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let a = repo.insert(call_aged(CallState::Initiating, Duration::hours(2)));
    let b = repo.insert(call_aged(CallState::Initiating, Duration::hours(3)));
    let c = repo.insert(call_aged(CallState::Initiating, Duration::hours(4)));
    repo.fail_transition_for(b.id);
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let err = workflow.run().await.unwrap_err();

    match err {
        AppError::Workflow(msg) => {
            assert!(msg.contains("1 of 3"), "unexpected message: {}", msg);
        }
        other => panic!("expected workflow error, got {:?}", other),
    }
    // Partial progress is preserved, not rolled back
    assert_eq!(repo.get(&a.sid).unwrap().state, CallState::Expired);
    assert_eq!(repo.get(&b.sid).unwrap().state, CallState::Initiating);
    assert_eq!(repo.get(&c.sid).unwrap().state, CallState::Expired);
}

#[tokio::test]
async fn two_hour_old_initiating_call_with_one_hour_threshold() {
    let repo = Arc::new(InMemoryPhoneCallRepository::new());
    let mut call = call_aged(CallState::Initiating, Duration::hours(2));
    call.sid = "CA123".to_string();
    repo.insert(call);
    let workflow = ExpirePhoneCalls::initiating(repo.clone(), &one_hour_thresholds());

    let run_started = Utc::now();
    workflow.run().await.unwrap();

    let swept = repo.get("CA123").unwrap();
    assert_eq!(swept.state, CallState::Expired);
    assert!(swept.date_updated >= run_started);
}
