//! The control loop: report, reconfigure, reconcile, once per interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{info, warn};
use url::Url;

use crate::args::MonitorArgs;
use crate::control::SharedControl;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{HttpTransport, build_client};
use crate::pool::WorkerPool;
use crate::reconfig::{ReconfigListener, spawn_stdin_reader};
use crate::report::Reporter;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

pub async fn run(args: MonitorArgs) -> AppResult<()> {
    let target = resolve_target(args.url.as_deref())?;
    if target.is_none() {
        warn!("Empty target URL given. Expect high CPU usage and a stream of request errors.");
    }

    let timeout = (args.timeout > 0.0).then(|| Duration::from_secs_f64(args.timeout));
    let client = build_client(timeout)?;
    let transport = Arc::new(HttpTransport::new(client, target));

    let control = Arc::new(SharedControl::new(
        args.thinktime,
        args.concurrency,
        args.open,
        args.count,
    ));

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
    let (chunk_rx, stdin_task) = spawn_stdin_reader();
    let mut listener = ReconfigListener::new(chunk_rx);

    let mut pool = WorkerPool::new(Arc::clone(&control), transport);
    pool.reconcile();

    let mut reporter = Reporter::new(Instant::now());
    // The first report belongs one full interval after start, and a stop
    // signal must be able to cut any wait short.
    let period = Duration::from_secs_f64(args.interval);
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Stop requested, cleaning up ...");
                control.stop();
            }
            _ = ticker.tick() => {}
        }

        // Tick order is fixed: drain statistics, apply reconfiguration,
        // reconcile the pool.
        reporter.tick(&control);
        listener.poll(&control);
        pool.reconcile();

        if !control.is_running() || control.budget_remaining() <= 0 {
            break;
        }
    }

    pool.shutdown().await;

    // Workers are joined; one final drain catches the tail of the run.
    reporter.tick(&control);
    tracing::debug!("Run complete: {} requests observed.", reporter.total_requests());

    stdin_task.abort();
    signal_task.abort();
    Ok(())
}

fn resolve_target(url: Option<&str>) -> AppResult<Option<Url>> {
    match url {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => Url::parse(raw).map(Some).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                value: raw.to_owned(),
                source: err,
            })
        }),
    }
}
