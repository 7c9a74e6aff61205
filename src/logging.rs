//! Logging setup: console output plus a persistent `agent.log` in the
//! report folder. `RUST_LOG` overrides the verbosity flags when set.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const LOG_FILE_NAME: &str = "agent.log";

/// Install the global subscriber. Called once at startup, after the config
/// is loaded (the log file lives in the report folder).
pub fn init(verbose: u8, report_folder: &Path) -> std::io::Result<()> {
    let log_file = open_log_file(report_folder)?;
    subscriber(filter_for(verbose), Some(log_file)).init();
    Ok(())
}

fn filter_for(verbose: u8) -> EnvFilter {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) => EnvFilter::new(env),
        Err(_) => EnvFilter::new(match verbose {
            0 => crate::default_log_filter(),
            1 => "ablage=debug",
            _ => "ablage=trace",
        }),
    }
}

/// Open (appending) the log file, creating the report folder if needed.
fn open_log_file(report_folder: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(report_folder)?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_folder.join(LOG_FILE_NAME))
}

fn subscriber(filter: EnvFilter, log_file: Option<File>) -> impl tracing::Subscriber {
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(log_file.map(|file| {
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let file = open_log_file(dir.path()).unwrap();
        let sub = subscriber(EnvFilter::new("info"), Some(file));

        tracing::subscriber::with_default(sub, || {
            tracing::info!("dokument abgelegt");
        });

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("dokument abgelegt"));
    }

    #[test]
    fn log_file_is_appended_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        for message in ["erster lauf", "zweiter lauf"] {
            let file = open_log_file(dir.path()).unwrap();
            let sub = subscriber(EnvFilter::new("info"), Some(file));
            tracing::subscriber::with_default(sub, || {
                tracing::info!("{message}");
            });
        }

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("erster lauf"));
        assert!(content.contains("zweiter lauf"));
    }

    #[test]
    fn report_folder_is_created_for_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        open_log_file(&nested).unwrap();
        assert!(nested.join(LOG_FILE_NAME).exists());
    }
}
