//! Vision OCR engine — extracts text from document images via the LLM seam.
//!
//! The image branch uses it directly on the file bytes; the PDF branch feeds
//! it embedded images or rendered pages.

use base64::Engine as _;

use super::chain::ExtractionStrategy;
use super::ExtractionError;
use crate::llm::LlmClient;

const OCR_PROMPT: &str = "\
Extract ALL visible text from this document image. Preserve the reading \
order and line structure. Output only the extracted text, with no \
commentary and no formatting markers.";

/// Vision OCR backed by an `LlmClient`.
pub struct VisionOcr<'a> {
    llm: &'a dyn LlmClient,
    model: &'a str,
    prompt: String,
}

impl<'a> VisionOcr<'a> {
    pub fn new(llm: &'a dyn LlmClient, model: &'a str, language: &str) -> Self {
        let prompt = format!("{OCR_PROMPT} The document language is most likely '{language}'.");
        Self { llm, model, prompt }
    }

    /// OCR a single encoded image (PNG/JPEG bytes).
    pub fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let text = self
            .llm
            .generate_with_image(self.model, &self.prompt, &encoded)?;
        Ok(text)
    }
}

/// Image-branch strategy: OCR the file bytes as-is.
pub struct ImageOcr<'a> {
    bytes: &'a [u8],
    ocr: &'a VisionOcr<'a>,
}

impl<'a> ImageOcr<'a> {
    pub fn new(bytes: &'a [u8], ocr: &'a VisionOcr<'a>) -> Self {
        Self { bytes, ocr }
    }
}

impl ExtractionStrategy for ImageOcr<'_> {
    fn name(&self) -> &'static str {
        "image-ocr"
    }

    fn extract(&self) -> Result<String, ExtractionError> {
        self.ocr.ocr_image(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[test]
    fn ocr_passes_text_through() {
        let llm = MockLlmClient::new("").with_vision_response("Vertrag Seite 1");
        let ocr = VisionOcr::new(&llm, "vision-model", "de");
        let text = ocr.ocr_image(&[1, 2, 3]).unwrap();
        assert_eq!(text, "Vertrag Seite 1");
    }

    #[test]
    fn prompt_mentions_configured_language() {
        let llm = MockLlmClient::new("");
        let ocr = VisionOcr::new(&llm, "vision-model", "fr");
        assert!(ocr.prompt.contains("'fr'"));
    }
}
