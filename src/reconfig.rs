//! Live key=value reconfiguration from a line-oriented input stream.

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::control::SharedControl;

const STDIN_CHUNK_SIZE: usize = 1024;

/// Owns stdin and forwards raw chunks to the listener. The task ends at EOF
/// or when the listener goes away; neither stops the run.
pub fn spawn_stdin_reader() -> (mpsc::UnboundedReceiver<String>, JoinHandle<()>) {
    let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; STDIN_CHUNK_SIZE];
        loop {
            match stdin.read(&mut buf).await {
                Ok(0) => break,
                Ok(len) => {
                    let chunk =
                        String::from_utf8_lossy(buf.get(..len).unwrap_or_default()).into_owned();
                    if chunk_tx.send(chunk).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("Failed to read reconfiguration input: {}", err);
                    break;
                }
            }
        }
    });
    (chunk_rx, task)
}

/// Applies complete `key=value` lines to the shared tunables, carrying
/// partial lines over between ticks.
pub struct ReconfigListener {
    buffer: String,
    input: mpsc::UnboundedReceiver<String>,
}

impl ReconfigListener {
    #[must_use]
    pub fn new(input: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            buffer: String::new(),
            input,
        }
    }

    /// Drains all currently available input without blocking; does nothing
    /// when no new bytes arrived.
    pub fn poll(&mut self, control: &SharedControl) {
        let mut received = false;
        while let Ok(chunk) = self.input.try_recv() {
            self.buffer.push_str(&chunk);
            received = true;
        }
        if !received {
            return;
        }

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            apply_line(line.trim_end_matches(['\n', '\r']), control);
        }
    }
}

fn apply_line(line: &str, control: &SharedControl) {
    for token in line.split_whitespace() {
        let parts: Vec<&str> = token.split('=').collect();
        match parts.as_slice() {
            [key, value] => apply_key_value(key, value, control),
            _ => warn!("Cannot parse key-value '{}'", token),
        }
    }
}

fn apply_key_value(key: &str, value: &str, control: &SharedControl) {
    match key {
        "thinktime" => match value.parse::<f64>() {
            Ok(seconds) => {
                control.set_think_time(seconds);
                info!("set thinktime={}", seconds);
            }
            Err(err) => warn!("Invalid thinktime '{}': {}", value, err),
        },
        "concurrency" => match value.parse::<i64>() {
            Ok(count) => {
                control.set_desired_concurrency(count);
                info!("set concurrency={}", count);
            }
            Err(err) => warn!("Invalid concurrency '{}': {}", value, err),
        },
        "open" => match value.parse::<i64>() {
            Ok(flag) => {
                control.set_open_loop(flag != 0);
                info!("set open={}", flag);
            }
            Err(err) => warn!("Invalid open flag '{}': {}", value, err),
        },
        _ => warn!("Unknown key '{}'", key),
    }
}
