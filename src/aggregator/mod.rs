// src/aggregator/mod.rs
pub mod rss;
pub mod types;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::aggregator::types::{Candidate, FeedProvider, RawFeedItem};
use crate::config::DigestConfig;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_total", "Total items parsed from feeds.");
        describe_counter!(
            "feed_kept_total",
            "Candidates kept after recency filtering and truncation."
        );
        describe_counter!("feed_provider_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
    });
}

const EXCERPT_MAX_CHARS: usize = 500;

/// Normalize a feed excerpt: decode entities, strip tags, collapse whitespace.
pub fn normalize_excerpt(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap
    if out.chars().count() > EXCERPT_MAX_CHARS {
        out = out.chars().take(EXCERPT_MAX_CHARS).collect();
    }

    out
}

/// Pure selection step, separated from I/O for testability: recency window
/// (inclusive at the cutoff), per-source cap in native feed order, global
/// sort by descending publish time, global cap, 1-based indices.
pub fn select_candidates(
    per_source: Vec<Vec<RawFeedItem>>,
    cfg: &DigestConfig,
    now: u64,
) -> Vec<Candidate> {
    let cutoff = now.saturating_sub(cfg.window_hours.saturating_mul(3600));

    let mut pool: Vec<RawFeedItem> = Vec::new();
    for items in per_source {
        pool.extend(
            items
                .into_iter()
                .filter(|it| it.published_at > 0 && it.published_at >= cutoff)
                .take(cfg.per_source_limit),
        );
    }

    // Descending by publish time; ties broken by source/title so the order
    // stays deterministic even when fetches run concurrently.
    pool.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.source_name.cmp(&b.source_name))
            .then_with(|| a.title.cmp(&b.title))
    });
    pool.truncate(cfg.max_items);

    pool.into_iter()
        .enumerate()
        .map(|(i, item)| Candidate {
            index: (i + 1) as u32,
            item,
        })
        .collect()
}

/// Fetch all configured feeds and produce the candidate set for one request.
/// A failing provider contributes zero items and never aborts aggregation.
pub async fn run_aggregation(
    providers: &[Box<dyn FeedProvider>],
    cfg: &DigestConfig,
    now: u64,
) -> Vec<Candidate> {
    ensure_metrics_described();

    let mut per_source = Vec::with_capacity(providers.len());
    for p in providers {
        match p.fetch_latest().await {
            Ok(items) => per_source.push(items),
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "feed provider error");
                counter!("feed_provider_errors_total").increment(1);
            }
        }
    }

    let candidates = select_candidates(per_source, cfg, now);
    counter!("feed_kept_total").increment(candidates.len() as u64);
    candidates
}
