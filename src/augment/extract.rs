// src/augment/extract.rs
//! Best-effort structured extraction from an untrusted natural-language
//! channel: the service is asked for pure JSON but may wrap it in prose.
//! This module is the narrow seam to swap for a strict-JSON service mode;
//! merge logic never sees raw text.

use serde_json::Value;
use thiserror::Error;

use crate::augment::merge::Enrichment;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in response")]
    NoJsonObject { snippet: String },
    #[error("response JSON is invalid: {source}")]
    InvalidJson {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response JSON lacks a 'results' array")]
    MissingResults { snippet: String },
}

impl ExtractError {
    /// Raw-text snippet carried for the 500 error body.
    pub fn snippet(&self) -> &str {
        match self {
            ExtractError::NoJsonObject { snippet }
            | ExtractError::InvalidJson { snippet, .. }
            | ExtractError::MissingResults { snippet } => snippet,
        }
    }
}

fn snippet_of(text: &str) -> String {
    text.chars().take(500).collect()
}

/// Locate the first balanced top-level `{...}` substring. The scan is aware
/// of JSON strings and escapes, so braces inside string values do not
/// terminate it early.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the first top-level JSON object from free-form response text.
pub fn extract_json_object(text: &str) -> Result<Value, ExtractError> {
    let raw = first_json_object(text).ok_or_else(|| ExtractError::NoJsonObject {
        snippet: snippet_of(text),
    })?;
    serde_json::from_str(raw).map_err(|source| ExtractError::InvalidJson {
        snippet: snippet_of(text),
        source,
    })
}

/// Extract per-item enrichment entries from response text. Entries that fail
/// to deserialize individually are dropped (the merge step falls back for
/// their candidates); a missing `results` array fails the whole attempt.
pub fn extract_results(text: &str) -> Result<Vec<Enrichment>, ExtractError> {
    let value = extract_json_object(text)?;
    let results = value
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::MissingResults {
            snippet: snippet_of(text),
        })?;

    let mut out = Vec::with_capacity(results.len());
    for entry in results {
        match serde_json::from_value::<Enrichment>(entry.clone()) {
            Ok(e) => out.push(e),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed result entry");
            }
        }
    }
    Ok(out)
}
