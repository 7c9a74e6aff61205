//! Filing stage: turn the analysis into a destination folder + filename and
//! move the document there.
//!
//! This stage is infallible by design — every step has a deterministic
//! fallback (today's date, the default category, a safe filename, leaving
//! the file where it is).

pub mod dates;
pub mod filename;
pub mod mover;

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::pipeline::analysis::DocumentAnalysis;

/// Result of filing one document.
#[derive(Debug, Clone)]
pub struct FiledDocument {
    /// Where the file lives now; equals the original path when the move
    /// failed.
    pub moved_path: PathBuf,
    pub filename: String,
    pub category: String,
    /// False when the move failed and the file stayed in the input folder.
    pub moved: bool,
}

/// Compute the destination from config templates and the analysis, then
/// move the file.
pub fn organize(config: &AppConfig, analysis: &DocumentAnalysis, file_path: &Path) -> FiledDocument {
    let company = analysis
        .entities
        .organization
        .as_deref()
        .unwrap_or("unknown")
        .trim()
        .to_string();

    let date = dates::resolve_document_date(analysis.entities.document_date.as_deref());

    let category = config.normalize_category(&analysis.classification);
    // The raw classification doubles as the label for per-label overrides.
    let label = analysis.classification.trim().to_lowercase();
    let label = (!label.is_empty()).then_some(label.as_str());

    let target_dir = filename::destination_folder(config, &category, label, &company, date);

    let summary = if analysis.summary.trim().is_empty() {
        "nosummary"
    } else {
        analysis.summary.trim()
    };

    let new_name = filename::destination_filename(
        config, &category, label, &company, summary, date, file_path,
    );

    tracing::info!(
        src = %file_path.display(),
        dir = %target_dir.display(),
        name = %new_name,
        "filing document"
    );

    let moved_path = mover::move_rename_file(file_path, &new_name, &target_dir);
    let moved = moved_path != file_path;
    let filename = moved_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    FiledDocument {
        moved_path,
        filename,
        category,
        moved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis::DocumentEntities;

    fn test_config() -> (tempfile::TempDir, AppConfig) {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            concat!(
                "input_folder: {0}/inbox\n",
                "output_folder: {0}/filed\n",
                "report_folder: {0}/reports\n",
                "category_list: [Rechnung, Vertrag, Sonstiges]\n",
                "category_paths:\n",
                "  rechnung:\n",
                "    folder: 'Rechnungen/{{year}}'\n",
                "    naming: '{{date}}_rechnung_{{company}}_{{content_summary}}.pdf'\n",
                "  sonstiges:\n",
                "    folder: 'Sonstiges'\n",
            ),
            dir.path().display()
        );
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        let config = AppConfig::load(&path).unwrap();
        std::fs::create_dir_all(&config.input_folder).unwrap();
        (dir, config)
    }

    fn analysis(classification: &str, org: &str, date: &str, summary: &str) -> DocumentAnalysis {
        DocumentAnalysis {
            classification: classification.to_string(),
            entities: DocumentEntities {
                organization: (!org.is_empty()).then(|| org.to_string()),
                document_date: (!date.is_empty()).then(|| date.to_string()),
            },
            summary: summary.to_string(),
        }
    }

    #[test]
    fn end_to_end_invoice_scenario() {
        let (_dir, config) = test_config();
        let src = config.input_folder.join("invoice_2024.pdf");
        std::fs::write(&src, b"pdf bytes").unwrap();

        let filed = organize(
            &config,
            &analysis("Rechnung", "IKEA", "01.03.2024", "chair"),
            &src,
        );

        assert!(filed.moved);
        assert_eq!(filed.category, "rechnung");
        assert_eq!(filed.filename, "240301_rechnung_ikea_chair.pdf");
        assert_eq!(
            filed.moved_path,
            config
                .output_folder
                .join("Rechnungen/2024")
                .join("240301_rechnung_ikea_chair.pdf")
        );
        assert!(filed.moved_path.exists());
        assert!(!src.exists());
    }

    #[test]
    fn unknown_classification_files_under_default_category() {
        let (_dir, config) = test_config();
        let src = config.input_folder.join("mystery.pdf");
        std::fs::write(&src, b"x").unwrap();

        let filed = organize(&config, &analysis("Steuerbescheid", "", "", ""), &src);

        assert_eq!(filed.category, "sonstiges");
        assert!(filed.moved_path.starts_with(config.output_folder.join("Sonstiges")));
        // Missing organization and summary get deterministic placeholders.
        assert!(filed.filename.contains("unknown"));
        assert!(filed.filename.contains("nosummary"));
    }

    #[test]
    fn image_keeps_its_extension() {
        let (_dir, config) = test_config();
        let src = config.input_folder.join("scan.JPG");
        std::fs::write(&src, b"jpg").unwrap();

        let filed = organize(
            &config,
            &analysis("Rechnung", "IKEA", "2024-03-01", "chair"),
            &src,
        );
        assert!(filed.filename.ends_with(".jpg"));
    }

    #[test]
    fn failed_move_is_reported_as_unmoved() {
        let (_dir, config) = test_config();
        let src = config.input_folder.join("stuck.pdf");
        std::fs::write(&src, b"x").unwrap();
        // A file where the destination directory should go makes
        // create_dir_all fail, so the move cannot happen.
        std::fs::create_dir_all(&config.output_folder).unwrap();
        std::fs::write(config.output_folder.join("Sonstiges"), b"blocker").unwrap();

        let filed = organize(&config, &analysis("Unbekannt", "", "", ""), &src);

        assert!(!filed.moved);
        assert_eq!(filed.moved_path, src);
        assert!(src.exists());
    }

    #[test]
    fn organizing_never_deletes_the_file() {
        let (_dir, config) = test_config();
        let src = config.input_folder.join("doc.pdf");
        std::fs::write(&src, b"x").unwrap();

        let filed = organize(&config, &analysis("Rechnung", "IKEA", "", "chair"), &src);

        let at_new = filed.moved_path.exists();
        let at_old = src.exists();
        assert!(at_new ^ at_old, "file must exist at exactly one path");
    }
}
