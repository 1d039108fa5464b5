// src/aggregator/types.rs
use anyhow::Result;

/// Placeholder title for feed entries that ship without one.
pub const UNTITLED: &str = "(untitled)";

/// One entry parsed from a feed document. Lives for a single request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: String,
    /// May be an empty string when the feed omits the link.
    pub link: String,
    /// Unix seconds; 0 when the feed date was absent or unparsable.
    pub published_at: u64,
    /// Normalized plain-text excerpt (entities decoded, tags stripped).
    pub excerpt: String,
    /// Display name of the originating feed source.
    pub source_name: String,
}

/// A feed item that survived recency filtering and truncation, tagged with
/// the 1-based position used to correlate it with its enrichment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub index: u32,
    pub item: RawFeedItem,
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawFeedItem>>;
    fn name(&self) -> &str;
}
