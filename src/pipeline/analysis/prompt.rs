//! Prompt construction for the analysis call.

/// Build the classification/extraction/summary prompt.
///
/// The model is asked for strict JSON; the parser enforces it.
pub fn build_analysis_prompt(text: &str, categories: &[String], language: &str) -> String {
    let categories = categories.join(", ");
    format!(
        "You receive the text of a document. Perform the following tasks:\n\
         \n\
         1. Classify the document into one of the following categories: {categories}\n\
         2. Extract the organization and document date (if available). For known \
         organizations, use the short official name (e.g. Bayerische Motoren Werke AG = BMW, \
         IKEA Deutschland GmbH = IKEA, Volkswagen AG = VW).\n\
         3. Provide a brief summary of the content in 1-3 words (without organization, \
         date, or category). If one item, be specific (e.g. iPhone 17 Pro). If you find \
         many items, try to summarize (e.g. chair, table, rack -> furniture).\n\
         \n\
         Return the response as JSON with the fields:\n\
         - classification (in language '{language}')\n\
         - entities: {{\"Organization\": ..., \"Document_Date\": ...}}\n\
         - summary (in language '{language}')\n\
         \n\
         ONLY RETURN THE JSON, NO ADDITIONAL TEXT.\n\
         \n\
         Text:\n\
         {text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_categories_and_text() {
        let categories = vec!["Rechnung".to_string(), "Vertrag".to_string()];
        let prompt = build_analysis_prompt("Dokumententext", &categories, "de");
        assert!(prompt.contains("Rechnung, Vertrag"));
        assert!(prompt.contains("Dokumententext"));
        assert!(prompt.contains("'de'"));
        assert!(prompt.contains("ONLY RETURN THE JSON"));
    }
}
