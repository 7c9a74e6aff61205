//! Ollama HTTP client for local LLM inference.
//!
//! One trait seam (`LlmClient`) covers both uses: plain text generation for
//! document analysis and image-attached generation for vision OCR. A mock
//! implementation backs the tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// LLM client abstraction (allows mocking).
pub trait LlmClient {
    /// Text-only generation.
    fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String, LlmError>;

    /// Generation with a single base64-encoded image attached (vision OCR).
    fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
    ) -> Result<String, LlmError>;
}

/// Ollama HTTP client.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    fn request(&self, body: &GenerateRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::Http(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                LlmError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.request(&GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
            images: None,
        })
    }

    fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
    ) -> Result<String, LlmError> {
        self.request(&GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
            images: Some(vec![image_base64]),
        })
    }
}

/// Mock LLM client for testing — returns configurable responses. Vision
/// responses can be queued to script multi-call scenarios; the queue falls
/// back to the fixed response once drained.
pub struct MockLlmClient {
    response: String,
    vision_response: String,
    vision_queue: std::cell::RefCell<std::collections::VecDeque<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            vision_response: String::new(),
            vision_queue: std::cell::RefCell::new(std::collections::VecDeque::new()),
        }
    }

    pub fn with_vision_response(mut self, response: &str) -> Self {
        self.vision_response = response.to_string();
        self
    }

    pub fn with_vision_responses(self, responses: &[&str]) -> Self {
        self.vision_queue
            .borrow_mut()
            .extend(responses.iter().map(|r| r.to_string()));
        self
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, _prompt: &str, _temperature: f32) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }

    fn generate_with_image(
        &self,
        _model: &str,
        _prompt: &str,
        _image_base64: &str,
    ) -> Result<String, LlmError> {
        if let Some(next) = self.vision_queue.borrow_mut().pop_front() {
            return Ok(next);
        }
        Ok(self.vision_response.clone())
    }
}
