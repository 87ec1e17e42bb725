mod app;
mod args;
mod config;
mod control;
mod entry;
mod error;
mod http;
mod logger;
mod pool;
mod reconfig;
mod report;
mod shutdown;
mod stats;
mod worker;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
