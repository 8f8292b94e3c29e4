//! Transports that send the refinement prompt to a hosted model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::error::RefineError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 200;

/// Sends a prompt and returns the model's text answer.
///
/// Implementations make exactly one attempt; retries are the caller's
/// business.
pub trait RefineTransport {
    /// Recorded as `refined_by` on refined schemas.
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<String, RefineError>;
}

/// Gemini connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        let model = if self.model.is_empty() { DEFAULT_MODEL } else { &self.model };
        let endpoint = if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{endpoint}/{model}:generateContent?key={}", self.api_key)
    }
}

/// Blocking Gemini `generateContent` client.
pub struct GeminiTransport {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiTransport {
    pub fn new(config: GeminiConfig) -> Result<Self, RefineError> {
        if config.api_key.trim().is_empty() {
            return Err(RefineError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl std::fmt::Debug for GeminiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTransport")
            .field("model", &self.config.model)
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl RefineTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String, RefineError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.client.post(self.config.url()).json(&request).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(RefineError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let decoded: GenerateResponse =
            serde_json::from_str(&body).map_err(|source| RefineError::Parse {
                source,
                excerpt: truncate(&body, ERROR_BODY_LIMIT),
            })?;
        decoded.into_text()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    error: Option<ProviderError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderError {
    message: String,
    code: i64,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, RefineError> {
        if let Some(error) = self.error {
            return Err(RefineError::Provider {
                code: error.code,
                message: error.message,
            });
        }
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(RefineError::EmptyResponse)
    }
}

/// First `limit` characters of `text`, marked when cut.
pub(crate) fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
