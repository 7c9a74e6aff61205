//! Ordered fallback runner: try each strategy in turn, first non-empty
//! sanitized text wins. Strategy errors are logged and swallowed — the next
//! strategy gets its chance.

use super::sanitize::sanitize_extracted_text;
use super::ExtractionError;

/// One attempt at getting text out of a document.
pub trait ExtractionStrategy {
    /// Method tag recorded in the outcome, e.g. "native" or "render-ocr".
    fn name(&self) -> &'static str;

    fn extract(&self) -> Result<String, ExtractionError>;
}

/// Extracted text plus the tag of the strategy that produced it.
/// Both are empty when every strategy failed or returned nothing.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub text: String,
    pub method: String,
}

/// Run strategies in order, stopping at the first non-empty result.
pub fn run_chain(strategies: &[&dyn ExtractionStrategy]) -> ExtractionOutcome {
    for strategy in strategies {
        match strategy.extract() {
            Ok(raw) => {
                let text = sanitize_extracted_text(&raw);
                if text.is_empty() {
                    tracing::warn!(strategy = strategy.name(), "strategy produced no text");
                    continue;
                }
                tracing::info!(
                    strategy = strategy.name(),
                    text_length = text.len(),
                    "strategy succeeded"
                );
                return ExtractionOutcome {
                    text,
                    method: strategy.name().to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(strategy = strategy.name(), error = %e, "strategy failed");
            }
        }
    }
    ExtractionOutcome::default()
}
