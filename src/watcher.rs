//! Watch mode: continuously process files dropped into the input folder.
//!
//! Uses a debounced filesystem watcher (waits 500ms for file writes to
//! complete) and feeds eligible paths into the pipeline one at a time.
//! Each debounced event batch gets one report with one row per processed
//! file, same columns as a batch run.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent};
use thiserror::Error;

use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::pipeline::{self, runner};
use crate::report::{self, ReportRecord};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create filesystem watcher: {0}")]
    Create(notify::Error),

    #[error("Failed to watch {0}: {1}")]
    Watch(PathBuf, notify::Error),
}

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watch the input folder and process files as they appear. Blocks forever;
/// terminate the process to stop.
pub fn watch(config: &AppConfig, llm: &dyn LlmClient) -> Result<(), WatchError> {
    let (tx, rx) = mpsc::channel::<Vec<DebouncedEvent>>();

    let mut debouncer = new_debouncer(
        DEBOUNCE,
        None,
        move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
            Ok(events) => {
                let _ = tx.send(events);
            }
            Err(errors) => {
                for error in errors {
                    tracing::error!(%error, "watcher error");
                }
            }
        },
    )
    .map_err(WatchError::Create)?;

    debouncer
        .watch(&config.input_folder, RecursiveMode::NonRecursive)
        .map_err(|e| WatchError::Watch(config.input_folder.clone(), e))?;

    tracing::info!(
        input = %config.input_folder.display(),
        "watching for new documents, press Ctrl+C to stop"
    );

    // The debouncer must stay alive for the callback to keep firing.
    for events in rx {
        process_batch(&eligible_paths(&events), config, llm);
    }

    drop(debouncer);
    Ok(())
}

/// Process one debounced batch of paths and write a single report for it.
fn process_batch(paths: &[PathBuf], config: &AppConfig, llm: &dyn LlmClient) {
    if paths.is_empty() {
        return;
    }

    let records: Vec<ReportRecord> = paths
        .iter()
        .map(|path| process_one(path, config, llm))
        .collect();

    if let Err(e) = report::write_report(&config.report_folder, &records) {
        tracing::error!(error = %e, "failed to write report");
    }
}

/// Pull intake-eligible file paths out of a debounced event batch.
/// Only create and modify events count; a move into the folder shows up as
/// a create.
fn eligible_paths(events: &[DebouncedEvent]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = events
        .iter()
        .filter(|event| {
            matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_)
            )
        })
        .flat_map(|event| event.paths.iter().cloned())
        .filter(|path| path.is_file() && runner::is_allowed(path))
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

fn process_one(path: &PathBuf, config: &AppConfig, llm: &dyn LlmClient) -> ReportRecord {
    match pipeline::process_document(path, config, llm) {
        Ok(processed) if processed.moved => {
            ReportRecord::success(path, &processed.moved_path, &processed.category)
        }
        Ok(processed) => ReportRecord::left_in_place(path, &processed.category),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "document failed");
            ReportRecord::failure(path, &e.to_string())
        }
    }
}
