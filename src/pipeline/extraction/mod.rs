//! Text extraction with ordered OCR fallbacks.
//!
//! PDF branch: native text layer → embedded-image OCR → full-page render OCR.
//! Image branch: vision OCR directly on the file bytes.
//!
//! Individual strategy failures are recoverable (logged, next strategy runs);
//! a missing input file is a hard precondition failure. When every strategy
//! comes up empty the outcome carries empty text and an empty method tag —
//! the analysis stage turns that into a terminal error for the document.

pub mod chain;
pub mod embedded;
pub mod ocr;
pub mod pdfium;
pub mod sanitize;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;
use crate::llm::{LlmClient, LlmError};
use crate::pipeline::router::FileKind;
use chain::{run_chain, ExtractionOutcome};
use embedded::EmbeddedImageOcr;
use ocr::{ImageOcr, VisionOcr};
use pdfium::{NativeText, PageRenderOcr};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("PDF has no pages")]
    EmptyDocument,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Vision model error: {0}")]
    Llm(#[from] LlmError),
}

/// Default rendering DPI for the full-page OCR fallback.
/// 200 DPI balances quality and vision-model inference speed.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// Extract text from a routed document, recording which method succeeded.
pub fn extract_document(
    path: &Path,
    kind: FileKind,
    llm: &dyn LlmClient,
    config: &AppConfig,
) -> Result<ExtractionOutcome, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;

    let ocr = VisionOcr::new(llm, &config.vision_model, &config.language);

    let outcome = match kind {
        FileKind::Image => {
            let image_ocr = ImageOcr::new(&bytes, &ocr);
            run_chain(&[&image_ocr])
        }
        FileKind::Document => {
            let native = NativeText::new(&bytes);
            let embedded = EmbeddedImageOcr::new(&bytes, &ocr);
            let rendered = PageRenderOcr::new(&bytes, &ocr, DEFAULT_RENDER_DPI);
            run_chain(&[&native, &embedded, &rendered])
        }
    };

    tracing::info!(
        path = %path.display(),
        method = %outcome.method,
        text_length = outcome.text.len(),
        "extraction finished"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn test_config(dir: &Path) -> AppConfig {
        let yaml = format!(
            "input_folder: {0}\noutput_folder: {0}\nreport_folder: {0}\n",
            dir.display()
        );
        let path = dir.join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        AppConfig::load(&path).unwrap()
    }

    #[test]
    fn missing_file_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let llm = MockLlmClient::new("");
        let result = extract_document(
            &dir.path().join("ghost.pdf"),
            FileKind::Document,
            &llm,
            &config,
        );
        assert!(matches!(result, Err(ExtractionError::FileNotFound(_))));
    }

    #[test]
    fn image_branch_uses_vision_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let llm = MockLlmClient::new("").with_vision_response("Rechnung IKEA 01.03.2024");
        let outcome = extract_document(&path, FileKind::Image, &llm, &config).unwrap();
        assert_eq!(outcome.method, "image-ocr");
        assert!(outcome.text.contains("IKEA"));
    }

    #[test]
    fn image_branch_empty_ocr_yields_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let path = dir.path().join("blank.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let llm = MockLlmClient::new("").with_vision_response("   ");
        let outcome = extract_document(&path, FileKind::Image, &llm, &config).unwrap();
        assert!(outcome.text.is_empty());
        assert!(outcome.method.is_empty());
    }
}
