//! Batch processing: scan the input folder and run every eligible file
//! through the pipeline, isolating per-document failures.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::report::{self, ReportRecord};

/// Extensions eligible for intake (case-insensitive).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub report_path: Option<PathBuf>,
}

/// Whether a path is eligible for intake.
pub fn is_allowed(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            ALLOWED_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false)
}

/// List eligible files in the input folder, sorted by name for a stable
/// processing order. Subdirectories are not descended into.
pub fn scan_input_folder(input_folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_allowed(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Process every eligible file in the input folder. One document failing
/// never stops the batch; each failure becomes a report row instead.
pub fn run_batch(config: &AppConfig, llm: &dyn LlmClient) -> std::io::Result<BatchSummary> {
    let files = scan_input_folder(&config.input_folder)?;
    tracing::info!(
        input = %config.input_folder.display(),
        count = files.len(),
        "starting batch run"
    );

    let mut summary = BatchSummary::default();
    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        match super::process_document(path, config, llm) {
            Ok(processed) if processed.moved => {
                summary.processed += 1;
                records.push(ReportRecord::success(
                    path,
                    &processed.moved_path,
                    &processed.category,
                ));
            }
            Ok(processed) => {
                // Analyzed but not filed; the report must not claim success.
                summary.failed += 1;
                tracing::error!(path = %path.display(), "document left in place");
                records.push(ReportRecord::left_in_place(path, &processed.category));
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(path = %path.display(), error = %e, "document failed");
                records.push(ReportRecord::failure(path, &e.to_string()));
            }
        }
    }

    match report::write_report(&config.report_folder, &records) {
        Ok(path) => summary.report_path = Some(path),
        Err(e) => tracing::error!(error = %e, "failed to write run report"),
    }

    tracing::info!(
        processed = summary.processed,
        failed = summary.failed,
        "batch run finished"
    );
    Ok(summary)
}
