//! Strict JSON parsing of the model's analysis response.
//!
//! Models that were told "only return the JSON" still like to wrap it in a
//! markdown code fence; that wrapper is tolerated. Anything that then fails
//! `serde_json` is a malformed response — a terminal error for the document.

use serde::Deserialize;

use super::{AnalysisError, DocumentAnalysis, DocumentEntities};

/// Parse the model response into a `DocumentAnalysis`.
pub fn parse_analysis_response(response: &str) -> Result<DocumentAnalysis, AnalysisError> {
    let json_str = strip_code_fence(response.trim());

    #[derive(Deserialize)]
    struct RawAnalysis {
        classification: Option<String>,
        entities: Option<DocumentEntities>,
        summary: Option<String>,
    }

    let raw: RawAnalysis =
        serde_json::from_str(json_str).map_err(|e| AnalysisError::MalformedResponse {
            reason: e.to_string(),
            raw: response.to_string(),
        })?;

    let mut entities = raw.entities.unwrap_or_default();
    entities.organization = entities
        .organization
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty());
    entities.document_date = entities
        .document_date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(DocumentAnalysis {
        classification: raw.classification.unwrap_or_default().trim().to_string(),
        entities,
        summary: raw.summary.unwrap_or_default().trim().to_string(),
    })
}

/// Strip a surrounding ```json … ``` (or plain ```) fence when present.
fn strip_code_fence(response: &str) -> &str {
    let Some(start) = response.find("```") else {
        return response;
    };
    let after_fence = &response[start + 3..];
    let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
    match after_fence.find("```") {
        Some(end) => after_fence[..end].trim(),
        None => after_fence.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let analysis = parse_analysis_response(
            r#"{"classification": "Rechnung", "entities": {"Organization": "IKEA", "Document_Date": "2024-03-01"}, "summary": "Stuhl"}"#,
        )
        .unwrap();
        assert_eq!(analysis.classification, "Rechnung");
        assert_eq!(analysis.entities.document_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn parses_fenced_json() {
        let response = "```json\n{\"classification\": \"Vertrag\", \"entities\": {}, \"summary\": \"Miete\"}\n```";
        let analysis = parse_analysis_response(response).unwrap();
        assert_eq!(analysis.classification, "Vertrag");
        assert_eq!(analysis.entities, DocumentEntities::default());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let analysis = parse_analysis_response("{}").unwrap();
        assert!(analysis.classification.is_empty());
        assert!(analysis.summary.is_empty());
        assert!(analysis.entities.organization.is_none());
    }

    #[test]
    fn blank_entity_values_become_none() {
        let analysis = parse_analysis_response(
            r#"{"classification": "x", "entities": {"Organization": "  ", "Document_Date": ""}, "summary": "y"}"#,
        )
        .unwrap();
        assert!(analysis.entities.organization.is_none());
        assert!(analysis.entities.document_date.is_none());
    }

    #[test]
    fn malformed_json_is_an_error_with_raw_output() {
        let err = parse_analysis_response("{not json}").unwrap_err();
        let AnalysisError::MalformedResponse { raw, .. } = err else {
            panic!("expected MalformedResponse");
        };
        assert_eq!(raw, "{not json}");
    }

    #[test]
    fn prose_around_json_is_rejected() {
        // Strict contract: prose without a fence is not repaired.
        let err = parse_analysis_response("Here you go: {\"classification\": \"x\"}");
        assert!(err.is_err());
    }
}
