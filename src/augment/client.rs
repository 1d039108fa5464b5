// src/augment/client.rs
//! Generation-service boundary: the trait the pipeline talks to, the typed
//! error kinds, and the Gemini transport adapter. Transient-overload vs other
//! failures is classified once here, never re-derived from message text.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Failure kinds of a single generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service credential is not configured")]
    MissingApiKey,
    /// Upstream "too many requests / service overloaded" condition. The only
    /// retryable kind.
    #[error("generation service overloaded: {0}")]
    Overloaded(String),
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation service returned an empty response")]
    EmptyResponse,
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Overloaded(_))
    }
}

/// Trait object used by the pipeline (and mocked in tests).
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one prompt, get the raw free-form text back.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Whether a credential is configured. Checked per request so a missing
    /// key is a clean 500, not a crash at startup.
    fn has_credentials(&self) -> bool {
        true
    }

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Gemini `generateContent` adapter. Requires `GEMINI_API_KEY`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok(), None)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<RespCandidate>,
        }
        #[derive(Deserialize)]
        struct RespCandidate {
            content: RespContent,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let url = format!(
            "{GEMINI_ENDPOINT}/models/{}:generateContent?key={api_key}",
            self.model
        );
        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self.http.post(&url).json(&req).send().await?;
        let status = resp.status();

        if status.as_u16() == 429 || status.as_u16() == 503 {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Overloaded(snippet(&body)));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body: Resp = resp.json().await?;
        let text: String = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Cap diagnostic bodies carried inside errors.
fn snippet(s: &str) -> String {
    s.chars().take(500).collect()
}
