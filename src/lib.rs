pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod watcher;

/// Application-level constants
pub const APP_NAME: &str = "Ablage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "ablage=info"
}
