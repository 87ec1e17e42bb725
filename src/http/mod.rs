//! The transport seam: one request out, a pass/fail flag and marker bits back.
mod classify;
mod transport;

pub use classify::{MarkerSet, classify_body};
pub use transport::{FetchOutcome, HttpTransport, Transport, build_client};
