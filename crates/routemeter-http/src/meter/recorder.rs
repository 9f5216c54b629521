//! Background recorder.
//!
//! Observations are queued on a bounded channel and applied by one worker
//! task, so registry work never runs on the response path. Submitting never
//! waits: a full queue drops the observation.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;

use routemeter_core::{MetricsManager, Observation};

enum Job {
    Record(Observation),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::Sender<Job>,
}

impl Recorder {
    /// Spawn the worker. Must be called inside a tokio runtime.
    pub fn spawn(manager: Arc<MetricsManager>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_worker(manager, rx));
        Self { tx }
    }

    /// Fire-and-forget.
    pub fn submit(&self, obs: Observation) {
        match self.tx.try_send(Job::Record(obs)) {
            Ok(()) => {}
            Err(TrySendError::Full(Job::Record(obs))) => {
                tracing::warn!(
                    method = %obs.route.method,
                    path = %obs.route.path,
                    status = obs.status,
                    "recorder queue full; observation dropped"
                );
            }
            Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("recorder stopped; observation dropped");
            }
        }
    }

    /// Wait until everything submitted before this call has been recorded.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Flush(ack)).await.is_err() {
            return;
        }
        let _ = done.await;
    }
}

async fn run_worker(manager: Arc<MetricsManager>, mut rx: mpsc::Receiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Record(obs) => {
                if let Err(e) = manager.record(&obs) {
                    tracing::error!(
                        code = e.code().as_str(),
                        method = %obs.route.method,
                        path = %obs.route.path,
                        error = %e,
                        "observation not recorded"
                    );
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("recorder worker exiting");
}
