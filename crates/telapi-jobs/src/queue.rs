//! In-process job transport
//!
//! A tokio mpsc-backed implementation of the `JobQueue` seam. Each submitted
//! dispatch request carries only a workflow name; the worker consumes
//! requests and hands them to the dispatcher, each executing independently of
//! the scheduler that submitted it.
//!
//! Reliable delivery and retry backoff are the responsibility of whatever
//! queue backs this seam in a given deployment; this transport only promises
//! that accepted submissions reach the dispatcher while the worker is alive.

use crate::dispatcher::ExecuteWorkflowJob;
use async_trait::async_trait;
use std::sync::Arc;
use telapi_core::{traits::JobQueue, AppError, AppResult};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Tokio mpsc-backed job queue
pub struct TokioJobQueue {
    sender: mpsc::UnboundedSender<String>,
}

impl TokioJobQueue {
    /// Create the queue and the receiving end for a `JobWorker`
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn submit(&self, workflow_name: &str) -> AppResult<()> {
        self.sender
            .send(workflow_name.to_string())
            .map_err(|e| AppError::Queue(format!("Failed to submit {}: {}", workflow_name, e)))
    }
}

/// Consumes dispatch requests and executes them through the dispatcher
pub struct JobWorker {
    receiver: mpsc::UnboundedReceiver<String>,
    dispatcher: Arc<ExecuteWorkflowJob>,
}

impl JobWorker {
    /// Create a worker over the queue's receiving end
    pub fn new(receiver: mpsc::UnboundedReceiver<String>, dispatcher: Arc<ExecuteWorkflowJob>) -> Self {
        Self {
            receiver,
            dispatcher,
        }
    }

    /// Run until every queue sender is dropped
    pub async fn run(mut self) {
        info!("Job worker started");

        while let Some(workflow_name) = self.receiver.recv().await {
            match self.dispatcher.execute(&workflow_name).await {
                Ok(_) => {}
                Err(e) if !e.is_retryable() => {
                    // Registration bug: surface loudly, never retry.
                    error!("Dropping job {}: {}", workflow_name, e);
                }
                Err(e) => {
                    warn!("Job {} failed, eligible for retry: {}", workflow_name, e);
                }
            }
        }

        info!("Job worker stopped: queue closed");
    }
}
