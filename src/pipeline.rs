// src/pipeline.rs
//! Request orchestration: aggregation → prompt → generation (with retry) →
//! extraction → merge. One run per HTTP request, no shared mutable state.

use thiserror::Error;

use crate::aggregator::types::FeedProvider;
use crate::aggregator::run_aggregation;
use crate::augment::client::{GenerationClient, GenerationError};
use crate::augment::extract::extract_results;
use crate::augment::merge::{merge, NewsItem};
use crate::augment::prompt::build_prompt;
use crate::config::{Backoff, DigestConfig};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("no recent items survived filtering across all configured feeds")]
    NoCandidates,
    /// The service answered, but no usable JSON was found. Never retried:
    /// malformed output is a systematic problem, waiting will not fix it.
    #[error("could not parse the generation response")]
    UnparsableResponse { snippet: String },
    /// Every attempt hit the transient-overload condition.
    #[error("generation service still overloaded after {attempts} attempts")]
    Overloaded { attempts: u32, last: String },
    #[error(transparent)]
    Generation(GenerationError),
}

impl PipelineError {
    /// Whether a caller may reasonably re-invoke later (503 vs 500).
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Overloaded { .. })
    }
}

/// One generation call per attempt, up to `max_attempts`. Only the overload
/// condition is retried; after each failed attempt k the loop sleeps
/// `backoff.delay_after(k)` to ride out the congestion.
pub async fn generate_with_retry(
    generator: &dyn GenerationClient,
    prompt: &str,
    max_attempts: u32,
    backoff: &Backoff,
) -> Result<String, PipelineError> {
    let mut last = String::new();
    for attempt in 1..=max_attempts {
        match generator.generate(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() => {
                tracing::warn!(attempt, max_attempts, error = %e, "generation overloaded, backing off");
                metrics::counter!("augment_overloaded_total").increment(1);
                last = e.to_string();
                tokio::time::sleep(backoff.delay_after(attempt)).await;
            }
            Err(GenerationError::MissingApiKey) => return Err(PipelineError::MissingApiKey),
            Err(e) => return Err(PipelineError::Generation(e)),
        }
    }
    Err(PipelineError::Overloaded {
        attempts: max_attempts,
        last,
    })
}

/// Run the full pipeline once and produce the final item array.
pub async fn run(
    providers: &[Box<dyn FeedProvider>],
    generator: &dyn GenerationClient,
    cfg: &DigestConfig,
) -> Result<Vec<NewsItem>, PipelineError> {
    // Credential precondition, checked per request so the service boots
    // without a key and reports it cleanly.
    if !generator.has_credentials() {
        return Err(PipelineError::MissingApiKey);
    }

    let now = chrono::Utc::now();
    let candidates = run_aggregation(providers, cfg, now.timestamp().max(0) as u64).await;
    if candidates.is_empty() {
        return Err(PipelineError::NoCandidates);
    }
    tracing::info!(count = candidates.len(), "candidates selected");

    let prompt = build_prompt(&candidates, &now.format("%Y-%m-%d").to_string());
    let text = generate_with_retry(generator, &prompt, cfg.max_attempts, &cfg.backoff).await?;

    let results = extract_results(&text).map_err(|e| {
        tracing::warn!(error = %e, "generation response unparsable");
        PipelineError::UnparsableResponse {
            snippet: e.snippet().to_string(),
        }
    })?;

    Ok(merge(&candidates, &results))
}
