//! Background job subsystem for TelAPI
//!
//! This crate contains the workflow-dispatch machinery that keeps call
//! records from rotting in transient states:
//!
//! - `ExpirePhoneCalls` - per-state expiry workflows that sweep stale calls
//! - `WorkflowRegistry` - the fixed name -> workflow catalog
//! - `ExecuteWorkflowJob` - resolves a dispatched name and runs the workflow
//! - `HourlyJob` - the periodic trigger that fans out dispatch requests
//! - `TokioJobQueue` / `JobWorker` - in-process job transport
//!
//! # Architecture
//!
//! The scheduler never runs workflows itself: it only submits one dispatch
//! request per registered workflow name, and each request executes as an
//! independent unit of work. Workflows are idempotent, so overlapping
//! scheduler invocations are harmless.

pub mod dispatcher;
pub mod queue;
pub mod scheduler;
pub mod workflows;

pub use dispatcher::ExecuteWorkflowJob;
pub use queue::{JobWorker, TokioJobQueue};
pub use scheduler::{HourlyJob, SCHEDULED_WORKFLOWS};
pub use workflows::{
    ExpirePhoneCalls, WorkflowRegistry, EXPIRE_INITIATING_PHONE_CALLS,
    EXPIRE_IN_PROGRESS_PHONE_CALLS,
};
