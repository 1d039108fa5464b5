// src/augment/merge.rs
//! Merge enrichment results back onto candidates. Pure and deterministic:
//! the same candidates and results always produce byte-identical output.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::types::Candidate;

/// Fallback summary when the service produced nothing usable for an item.
pub const FALLBACK_SUMMARY: &str = "要約を生成できませんでした。元記事をご覧ください。";
/// Fallback infographic fragment for the same case.
pub const FALLBACK_VISUAL: &str = r#"<div class="p-4 rounded-xl border-2 border-slate-200 text-center text-slate-500">図解を生成できませんでした</div>"#;
/// Trailing token stripped from feed display names for presentation.
pub const SOURCE_SUFFIX: &str = " AI";

/// Per-item output of the generation service, correlated by `index`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Enrichment {
    pub index: u32,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "translatedTitle")]
    pub translated_title: Option<String>,
    #[serde(default, rename = "visualHtml")]
    pub visual_html: Option<String>,
}

/// Final unit serialized to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub source: String,
    pub summary: String,
    pub url: String,
    #[serde(rename = "visualHtml")]
    pub visual_html: String,
}

/// Unix seconds → `YYYY-MM-DD` (UTC). 0 renders as the epoch date, but such
/// items never survive aggregation.
pub fn format_date(unix_secs: u64) -> String {
    Utc.timestamp_opt(unix_secs as i64, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

/// Display label: strip one trailing " AI" token from the source name.
pub fn display_source(name: &str) -> String {
    name.strip_suffix(SOURCE_SUFFIX).unwrap_or(name).to_string()
}

fn non_blank(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Build the final item array in candidate order. A missing result entry or
/// a blank field falls back per field, never per item.
pub fn merge(candidates: &[Candidate], enrichments: &[Enrichment]) -> Vec<NewsItem> {
    candidates
        .iter()
        .map(|c| {
            let found = enrichments.iter().find(|e| e.index == c.index);
            let title = found
                .and_then(|e| non_blank(e.translated_title.as_ref()))
                .unwrap_or(&c.item.title)
                .to_string();
            let summary = found
                .and_then(|e| non_blank(e.summary.as_ref()))
                .unwrap_or(FALLBACK_SUMMARY)
                .to_string();
            let visual_html = found
                .and_then(|e| non_blank(e.visual_html.as_ref()))
                .unwrap_or(FALLBACK_VISUAL)
                .to_string();
            NewsItem {
                title,
                published_at: format_date(c.item.published_at),
                source: display_source(&c.item.source_name),
                summary,
                url: c.item.link.clone(),
                visual_html,
            }
        })
        .collect()
}
