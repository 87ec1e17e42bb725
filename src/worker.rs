//! One parallel request-issuing unit: wait per the arrival model, send,
//! classify, record, repeat until cancelled or the budget runs out.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::control::SharedControl;
use crate::http::Transport;

/// Per-worker cancellation channel. Internal to the pool; never exposed to
/// request logic and never able to interrupt an in-flight send.
type CancelSender = broadcast::Sender<()>;
type CancelReceiver = broadcast::Receiver<()>;

const CANCEL_CHANNEL_CAPACITY: usize = 1;

pub struct WorkerHandle {
    id: usize,
    cancel: CancelSender,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Requests a graceful exit; observed at the worker's next wait point or
    /// loop re-entry.
    pub fn cancel(&self) {
        drop(self.cancel.send(()));
    }

    #[must_use]
    pub fn into_join(self) -> JoinHandle<()> {
        self.join
    }
}

pub fn spawn_worker(
    id: usize,
    control: Arc<SharedControl>,
    transport: Arc<dyn Transport>,
) -> WorkerHandle {
    let (cancel_tx, cancel_rx) = broadcast::channel(CANCEL_CHANNEL_CAPACITY);
    let join = tokio::spawn(worker_loop(id, control, transport, cancel_rx));
    WorkerHandle {
        id,
        cancel: cancel_tx,
        join,
    }
}

async fn worker_loop(
    id: usize,
    control: Arc<SharedControl>,
    transport: Arc<dyn Transport>,
    mut cancel_rx: CancelReceiver,
) {
    debug!("Worker {} started.", id);

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(id as u64));

    let mut cached_think_time = control.tuning().think_time;
    let mut wait_distribution = build_wait_distribution(cached_think_time);
    let mut last_arrival = Instant::now();

    while control.try_acquire_send() {
        if cancellation_pending(&mut cancel_rx) {
            break;
        }

        let tuning = control.tuning();
        if tuning.think_time != cached_think_time {
            cached_think_time = tuning.think_time;
            wait_distribution = build_wait_distribution(cached_think_time);
        }

        // Wait first, then send, so a fresh pool ramps up without a thundering
        // herd of simultaneous first requests.
        if tuning.think_time > 0.0
            && let Some(distribution) = wait_distribution.as_ref()
        {
            let sampled = distribution.sample(&mut rng);
            let mut wait = Duration::try_from_secs_f64(sampled).unwrap_or(Duration::ZERO);

            if tuning.open_loop {
                // The arrival schedule advances by the sampled interval no
                // matter how slow the server is; an already-due arrival is
                // the backpressure signal.
                let next_arrival = last_arrival.checked_add(wait).unwrap_or(last_arrival);
                wait = next_arrival.saturating_duration_since(Instant::now());
                if wait.is_zero() {
                    control.note_open_queuing();
                }
                last_arrival = next_arrival;
            }

            tokio::select! {
                _ = cancel_rx.recv() => break,
                () = sleep(wait) => {}
            }
        }

        let started = Instant::now();
        let outcome = transport.fetch().await;
        let elapsed = started.elapsed();

        control.record(outcome.failed, outcome.markers, elapsed);

        // Under a sustained error burst the loop would otherwise spin on the
        // statistics lock.
        if outcome.failed {
            tokio::task::yield_now().await;
        }
    }

    debug!("Worker {} exiting.", id);
}

fn build_wait_distribution(mean_seconds: f64) -> Option<Exp<f64>> {
    if mean_seconds > 0.0 {
        Exp::new(1.0 / mean_seconds).ok()
    } else {
        None
    }
}

fn cancellation_pending(cancel_rx: &mut CancelReceiver) -> bool {
    match cancel_rx.try_recv() {
        Ok(()) | Err(broadcast::error::TryRecvError::Closed) => true,
        Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Lagged(_)) => {
            false
        }
    }
}
