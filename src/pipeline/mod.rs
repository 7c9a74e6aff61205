//! The document pipeline: route → extract → analyze → organize.
//!
//! `process_document` drives a single file through all four stages. The
//! first two stages can fail for a document; filing cannot — once analysis
//! succeeded the document always ends up somewhere deterministic.

pub mod analysis;
pub mod extraction;
pub mod organize;
pub mod router;
pub mod runner;

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::LlmClient;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] extraction::ExtractionError),

    #[error(transparent)]
    Analysis(#[from] analysis::AnalysisError),
}

/// Full record of one successfully processed document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub id: Uuid,
    pub original_path: PathBuf,
    pub moved_path: PathBuf,
    pub filename: String,
    pub category: String,
    /// False when the file could not be moved and stayed in the input folder.
    pub moved: bool,
    /// Which extraction strategy produced the text.
    pub extraction_method: String,
    pub analysis: analysis::DocumentAnalysis,
}

/// Run one file through the whole pipeline.
pub fn process_document(
    path: &Path,
    config: &AppConfig,
    llm: &dyn LlmClient,
) -> Result<ProcessedDocument, PipelineError> {
    let id = Uuid::new_v4();
    tracing::info!(%id, path = %path.display(), "processing document");

    let kind = router::route(path);
    let extracted = extraction::extract_document(path, kind, llm, config)?;
    let analysis = analysis::analyze(&extracted.text, config, llm)?;
    let filed = organize::organize(config, &analysis, path);

    tracing::info!(
        %id,
        category = %filed.category,
        destination = %filed.moved_path.display(),
        "document processed"
    );

    Ok(ProcessedDocument {
        id,
        original_path: path.to_path_buf(),
        moved_path: filed.moved_path,
        filename: filed.filename,
        category: filed.category,
        moved: filed.moved,
        extraction_method: extracted.method,
        analysis,
    })
}
