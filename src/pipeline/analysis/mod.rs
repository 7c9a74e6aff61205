//! Document analysis: one LLM call that classifies, extracts entities and
//! summarizes. The model is instructed to return strict JSON; a malformed
//! response is a terminal failure for the document — no retry, no partial
//! result.

pub mod parser;
pub mod prompt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::llm::{LlmClient, LlmError};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No text extracted from document — nothing to analyze")]
    NoText,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to parse LLM response as JSON: {reason}\nRaw output:\n{raw}")]
    MalformedResponse { reason: String, raw: String },
}

/// Entities the model extracts from the document text. Best-effort: either
/// field may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DocumentEntities {
    #[serde(rename = "Organization")]
    pub organization: Option<String>,
    #[serde(rename = "Document_Date")]
    pub document_date: Option<String>,
}

/// Classification, entities and summary for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub classification: String,
    pub entities: DocumentEntities,
    pub summary: String,
}

/// Analyze extracted text: classify into the configured categories, pull out
/// organization/date, and summarize in a few words.
pub fn analyze(
    text: &str,
    config: &AppConfig,
    llm: &dyn LlmClient,
) -> Result<DocumentAnalysis, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::NoText);
    }

    let prompt = prompt::build_analysis_prompt(text, &config.category_list, &config.language);
    let response = llm.generate(&config.llm_model, &prompt, config.llm_temperature)?;

    let analysis = parser::parse_analysis_response(&response)?;
    tracing::info!(
        classification = %analysis.classification,
        organization = analysis.entities.organization.as_deref().unwrap_or(""),
        document_date = analysis.entities.document_date.as_deref().unwrap_or(""),
        summary = %analysis.summary,
        "analysis complete"
    );
    Ok(analysis)
}
