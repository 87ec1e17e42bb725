//! Command-line interface.
mod cli;
mod parsers;

#[cfg(test)]
mod tests;

pub use cli::MonitorArgs;
