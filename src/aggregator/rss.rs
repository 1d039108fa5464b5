// src/aggregator/rss.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::aggregator::normalize_excerpt;
use crate::aggregator::types::{FeedProvider, RawFeedItem, UNTITLED};
use crate::config::FeedSource;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RSS feeds use RFC 2822 dates; a few serve RFC 3339. Anything else maps to
/// 0 and gets filtered out by the aggregation window.
fn parse_feed_date(ts: &str) -> u64 {
    chrono::DateTime::parse_from_rfc2822(ts)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

/// Parse an RSS 2.0 document into feed items tagged with `source_name`.
/// Items keep the feed's native order.
pub fn parse_rss(xml: &str, source_name: &str) -> Result<Vec<RawFeedItem>> {
    let t0 = std::time::Instant::now();

    let rss: Rss = from_str(xml).with_context(|| format!("parsing rss xml for {source_name}"))?;
    let mut out = Vec::with_capacity(rss.channel.item.len());

    for it in rss.channel.item {
        let title = it
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
            .to_string();
        out.push(RawFeedItem {
            title,
            link: it.link.unwrap_or_default(),
            published_at: it.pub_date.as_deref().map(parse_feed_date).unwrap_or(0),
            excerpt: normalize_excerpt(it.description.as_deref().unwrap_or_default()),
            source_name: source_name.to_string(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_items_total").increment(out.len() as u64);

    Ok(out)
}

/// Shared HTTP client for all feed fetches (connection pooling).
pub fn feed_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("ai-news-digest/0.1 (+rss fetcher)")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(15))
        .build()
        .expect("reqwest client")
}

/// Fetches one configured feed over HTTP and parses it.
pub struct RssFeedProvider {
    source: FeedSource,
    http: reqwest::Client,
}

impl RssFeedProvider {
    pub fn new(source: FeedSource, http: reqwest::Client) -> Self {
        Self { source, http }
    }

    /// Build one provider per configured source over a shared client.
    pub fn build_all(feeds: &[FeedSource]) -> Vec<Box<dyn FeedProvider>> {
        let http = feed_http_client();
        feeds
            .iter()
            .map(|f| Box::new(Self::new(f.clone(), http.clone())) as Box<dyn FeedProvider>)
            .collect()
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawFeedItem>> {
        let resp = self
            .http
            .get(&self.source.url)
            .send()
            .await
            .with_context(|| format!("fetching feed {}", self.source.url))?
            .error_for_status()
            .with_context(|| format!("feed {} returned error status", self.source.name))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading feed body from {}", self.source.name))?;
        parse_rss(&body, &self.source.name)
    }

    fn name(&self) -> &str {
        &self.source.name
    }
}
