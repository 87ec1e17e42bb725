//! Reconciles the live worker count against the desired concurrency.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::control::SharedControl;
use crate::http::Transport;
use crate::worker::{WorkerHandle, spawn_worker};

pub struct WorkerPool {
    control: Arc<SharedControl>,
    transport: Arc<dyn Transport>,
    workers: Vec<WorkerHandle>,
    detached: Vec<JoinHandle<()>>,
    next_id: usize,
}

impl WorkerPool {
    #[must_use]
    pub fn new(control: Arc<SharedControl>, transport: Arc<dyn Transport>) -> Self {
        Self {
            control,
            transport,
            workers: Vec::new(),
            detached: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.workers.len()
    }

    #[cfg(test)]
    pub fn live_ids(&self) -> Vec<usize> {
        self.workers.iter().map(WorkerHandle::id).collect()
    }

    /// Grows or shrinks the pool to the desired concurrency. Shrinking
    /// cancels the most-recently-spawned workers without waiting for them;
    /// their handles are kept only for the final join at shutdown.
    pub fn reconcile(&mut self) {
        let desired = usize::try_from(self.control.tuning().desired_concurrency).unwrap_or(0);

        while self.workers.len() < desired {
            let id = self.next_id;
            self.next_id += 1;
            debug!("Spawning worker {} ({} desired).", id, desired);
            self.workers.push(spawn_worker(
                id,
                Arc::clone(&self.control),
                Arc::clone(&self.transport),
            ));
        }

        while self.workers.len() > desired {
            if let Some(handle) = self.workers.pop() {
                debug!("Cancelling worker {} ({} desired).", handle.id(), desired);
                handle.cancel();
                self.detached.push(handle.into_join());
            }
        }
    }

    /// Cancels every remaining worker, then joins all of them, detached ones
    /// included. Runs once, at final shutdown.
    pub async fn shutdown(mut self) {
        for worker in &self.workers {
            worker.cancel();
        }
        for worker in self.workers.drain(..) {
            if let Err(err) = worker.into_join().await {
                warn!("Worker join failed: {}", err);
            }
        }
        for join in self.detached.drain(..) {
            if let Err(err) = join.await {
                warn!("Detached worker join failed: {}", err);
            }
        }
    }
}
