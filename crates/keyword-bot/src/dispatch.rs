//! Bounded research dispatch.
//!
//! Webhook handlers must answer quickly, so research runs on a small worker
//! pool fed by a bounded queue. A full queue rejects the job instead of
//! letting load grow without limit.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::error::AppError;

/// One unit of research work: look up a keyword, report to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchJob {
    pub keyword: String,
    pub channel: String,
}

#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<ResearchJob>,
}

impl Dispatcher {
    /// Spawn `workers` tasks draining a queue of at most `queue_capacity`
    /// jobs. Each job is handed to `handler`; jobs have no ordering
    /// guarantee between workers and are never cancelled or retried.
    pub fn start<F, Fut>(queue_capacity: usize, workers: usize, handler: F) -> Self
    where
        F: Fn(ResearchJob) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, rx) = mpsc::channel::<ResearchJob>(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers {
            let rx = Arc::clone(&rx);
            let handler = handler.clone();
            tokio::spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next job.
                    let job = { rx.lock().await.recv().await };
                    let Some(job) = job else { break };
                    debug!(worker, keyword = %job.keyword, "picked up research job");
                    handler(job).await;
                }
                debug!(worker, "research worker stopped");
            });
        }

        Self { tx }
    }

    /// Enqueue a job without waiting. A saturated queue yields
    /// [`AppError::QueueFull`]; the caller decides how to tell the user.
    pub fn submit(&self, job: ResearchJob) -> Result<(), AppError> {
        self.tx.try_send(job).map_err(|_| AppError::QueueFull)
    }
}
