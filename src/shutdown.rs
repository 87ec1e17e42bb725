use tokio::sync::broadcast;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Forwards Ctrl+C and (on unix) SIGTERM/SIGQUIT into the shutdown channel.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        {
            let mut term_signal = match signal(SignalKind::terminate()) {
                Ok(stream) => Some(stream),
                Err(err) => {
                    tracing::warn!("Failed to register SIGTERM handler: {}", err);
                    None
                }
            };
            let mut quit_signal = match signal(SignalKind::quit()) {
                Ok(stream) => Some(stream),
                Err(err) => {
                    tracing::warn!("Failed to register SIGQUIT handler: {}", err);
                    None
                }
            };

            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    drop(shutdown_tx.send(()));
                }
                () = wait_signal(&mut term_signal) => {
                    drop(shutdown_tx.send(()));
                }
                () = wait_signal(&mut quit_signal) => {
                    drop(shutdown_tx.send(()));
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    drop(shutdown_tx.send(()));
                }
            }
        }
    })
}

#[cfg(unix)]
async fn wait_signal(stream: &mut Option<tokio::signal::unix::Signal>) {
    match stream.as_mut() {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
