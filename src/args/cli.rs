use clap::Parser;

use super::parsers::{parse_bool_env, parse_non_negative_seconds, parse_positive_seconds};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Real-time monitor of an HTTP server's throughput and latency - concurrent load workers, open/closed arrival models, live stdin reconfiguration, and windowed latency quartiles."
)]
pub struct MonitorArgs {
    /// Target URL to request
    #[arg(long, short = 'u', help_heading = "Common Options")]
    pub url: Option<String>,

    /// Number of concurrent request workers
    #[arg(long, short = 'c', default_value = "100", allow_hyphen_values = true, help_heading = "Common Options")]
    pub concurrency: i64,

    /// HTTP request timeout in seconds (0 disables the timeout)
    #[arg(long, default_value = "0", value_parser = parse_non_negative_seconds, help_heading = "Common Options")]
    pub timeout: f64,

    /// Mean interval between a worker's requests in seconds, sampled from an
    /// exponential distribution (Poisson arrivals)
    #[arg(long, default_value = "0", value_parser = parse_non_negative_seconds, help_heading = "Common Options")]
    pub thinktime: f64,

    /// Report interval in seconds
    #[arg(long, short = 'i', default_value = "1", value_parser = parse_positive_seconds, help_heading = "Common Options")]
    pub interval: f64,

    /// Open-loop arrivals: send times follow a fixed schedule independent of
    /// the server's response time, with client-side queuing tracked
    #[arg(long, help_heading = "Common Options")]
    pub open: bool,

    /// Stop after sending this many requests (default: do not stop)
    #[arg(long, short = 'n', help_heading = "Common Options")]
    pub count: Option<i64>,

    /// Path to config file (TOML/JSON). Defaults to ./httpmon.toml or
    /// ./httpmon.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by
    /// HTTPMON_LOG/RUST_LOG)
    #[arg(long, short = 'v', alias = "debug")]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
