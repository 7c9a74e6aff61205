//! CSV run reports.
//!
//! Every batch run writes one timestamped CSV into the configured report
//! folder, one row per processed file, successes and failures alike.
//! Report names are never reused: a second report within the same second
//! gets a counter suffix instead of overwriting the first.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create report folder {0}: {1}")]
    CreateFolder(PathBuf, #[source] std::io::Error),

    #[error("Failed to write report: {0}")]
    Write(#[from] csv::Error),
}

/// One row of the run report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    /// Original path in the input folder.
    pub original: String,
    /// Destination path; empty when the document was not moved.
    pub new: String,
    /// Category the document was filed under; empty on failure.
    pub category: String,
    /// When this file was processed, local time.
    pub timestamp: String,
    /// "ok", "unmoved" or "error".
    pub status: String,
    /// Error description; empty on success.
    pub error: String,
}

impl ReportRecord {
    pub fn success(original: &Path, moved: &Path, category: &str) -> Self {
        Self {
            original: original.display().to_string(),
            new: moved.display().to_string(),
            category: category.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: "ok".to_string(),
            error: String::new(),
        }
    }

    /// Document was analyzed but could not be moved; it stays in the input
    /// folder.
    pub fn left_in_place(original: &Path, category: &str) -> Self {
        Self {
            original: original.display().to_string(),
            new: String::new(),
            category: category.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: "unmoved".to_string(),
            error: "move failed, file left in place".to_string(),
        }
    }

    pub fn failure(original: &Path, error: &str) -> Self {
        Self {
            original: original.display().to_string(),
            new: String::new(),
            category: String::new(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: "error".to_string(),
            error: error.to_string(),
        }
    }
}

/// Write the records of one run as `report_<timestamp>.csv` into
/// `report_folder`. Returns the report path.
pub fn write_report(report_folder: &Path, records: &[ReportRecord]) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(report_folder)
        .map_err(|e| ReportError::CreateFolder(report_folder.to_path_buf(), e))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut path = report_folder.join(format!("report_{stamp}.csv"));
    // Watch mode can write several reports per second; never overwrite.
    let mut counter = 1;
    while path.exists() {
        path = report_folder.join(format!("report_{stamp}_{counter}.csv"));
        counter += 1;
    }

    let mut writer = csv::Writer::from_path(&path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    tracing::info!(path = %path.display(), rows = records.len(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            ReportRecord::success(
                &PathBuf::from("/inbox/a.pdf"),
                &PathBuf::from("/filed/rechnung/a.pdf"),
                "rechnung",
            ),
            ReportRecord::failure(&PathBuf::from("/inbox/b.pdf"), "no text extracted"),
        ];

        let path = write_report(dir.path(), &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "original,new,category,timestamp,status,error"
        );
        assert_eq!(lines.clone().count(), 2);
        assert!(content.contains("/filed/rechnung/a.pdf"));
        assert!(content.contains("no text extracted"));
    }

    #[test]
    fn report_filename_is_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), &[]).unwrap();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("report_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn same_second_reports_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_report(
            dir.path(),
            &[ReportRecord::failure(&PathBuf::from("/inbox/a.pdf"), "x")],
        )
        .unwrap();
        let second = write_report(
            dir.path(),
            &[ReportRecord::failure(&PathBuf::from("/inbox/b.pdf"), "y")],
        )
        .unwrap();

        assert_ne!(first, second);
        // The first report must survive the second write.
        let content = std::fs::read_to_string(&first).unwrap();
        assert!(content.contains("a.pdf"));
        assert!(!content.contains("b.pdf"));
    }

    #[test]
    fn unmoved_record_has_empty_destination() {
        let record = ReportRecord::left_in_place(&PathBuf::from("/inbox/a.pdf"), "rechnung");
        assert_eq!(record.status, "unmoved");
        assert!(record.new.is_empty());
        assert_eq!(record.category, "rechnung");
        assert!(!record.error.is_empty());
    }

    #[test]
    fn empty_run_still_writes_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), &[]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn creates_the_report_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("nested").join("reports");
        let path = write_report(&folder, &[]).unwrap();
        assert!(path.starts_with(&folder));
    }
}
