// tests/aggregator_pipeline.rs
//
// Aggregation behavior over mock feed providers: failure isolation, the
// 48-hour recency window, and candidate ordering.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use ai_news_digest::aggregator::run_aggregation;
use ai_news_digest::aggregator::types::{FeedProvider, RawFeedItem};
use ai_news_digest::config::DigestConfig;

struct StaticProvider {
    name: &'static str,
    items: Vec<RawFeedItem>,
}

#[async_trait]
impl FeedProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawFeedItem>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

struct FailingProvider;

#[async_trait]
impl FeedProvider for FailingProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawFeedItem>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "Broken AI"
    }
}

fn item(title: &str, published_at: u64, source: &str) -> RawFeedItem {
    RawFeedItem {
        title: title.to_string(),
        link: format!("https://example.test/{title}"),
        published_at,
        excerpt: "excerpt".to_string(),
        source_name: source.to_string(),
    }
}

const NOW: u64 = 1_756_000_000;
const HOUR: u64 = 3600;

#[tokio::test]
async fn failing_providers_contribute_zero_items_without_aborting() {
    let providers: Vec<Box<dyn FeedProvider>> = vec![
        Box::new(FailingProvider),
        Box::new(StaticProvider {
            name: "Good AI",
            items: vec![item("fresh", NOW - HOUR, "Good AI")],
        }),
        Box::new(FailingProvider),
    ];
    let out = run_aggregation(&providers, &DigestConfig::default(), NOW).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].item.title, "fresh");
}

#[tokio::test]
async fn all_providers_failing_yields_empty_candidate_set() {
    let providers: Vec<Box<dyn FeedProvider>> =
        vec![Box::new(FailingProvider), Box::new(FailingProvider)];
    let out = run_aggregation(&providers, &DigestConfig::default(), NOW).await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn recency_window_keeps_two_of_three_across_sources() {
    // Items at now-1h, now-10h, now-50h across two sources: the 50h-old one
    // falls outside the window; the survivors come back newest first.
    let providers: Vec<Box<dyn FeedProvider>> = vec![
        Box::new(StaticProvider {
            name: "A AI",
            items: vec![item("one-hour", NOW - HOUR, "A AI")],
        }),
        Box::new(StaticProvider {
            name: "B AI",
            items: vec![
                item("ten-hours", NOW - 10 * HOUR, "B AI"),
                item("fifty-hours", NOW - 50 * HOUR, "B AI"),
            ],
        }),
    ];
    let out = run_aggregation(&providers, &DigestConfig::default(), NOW).await;
    let titles: Vec<_> = out.iter().map(|c| c.item.title.as_str()).collect();
    assert_eq!(titles, vec!["one-hour", "ten-hours"]);
    assert_eq!(out[0].index, 1);
    assert_eq!(out[1].index, 2);
}

#[tokio::test]
async fn noisy_feed_cannot_dominate_the_candidate_set() {
    let noisy: Vec<_> = (0..10u64)
        .map(|i| item(&format!("noisy{i}"), NOW - i * 60, "Noisy AI"))
        .collect();
    let providers: Vec<Box<dyn FeedProvider>> = vec![
        Box::new(StaticProvider {
            name: "Noisy AI",
            items: noisy,
        }),
        Box::new(StaticProvider {
            name: "Quiet AI",
            items: vec![item("quiet", NOW - 30, "Quiet AI")],
        }),
    ];
    let out = run_aggregation(&providers, &DigestConfig::default(), NOW).await;
    assert_eq!(out.len(), 3);
    // The quiet source's item is recent enough to make the top three.
    assert!(out.iter().any(|c| c.item.source_name == "Quiet AI"));
    // Never more than three from one source even with max_items raised.
    let cfg = DigestConfig {
        max_items: 10,
        ..DigestConfig::default()
    };
    let noisy: Vec<_> = (0..10u64)
        .map(|i| item(&format!("noisy{i}"), NOW - i * 60, "Noisy AI"))
        .collect();
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(StaticProvider {
        name: "Noisy AI",
        items: noisy,
    })];
    let out = run_aggregation(&providers, &cfg, NOW).await;
    assert_eq!(out.len(), 3);
}

#[tokio::test]
async fn undated_items_are_dropped() {
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(StaticProvider {
        name: "A AI",
        items: vec![item("undated", 0, "A AI"), item("dated", NOW - HOUR, "A AI")],
    })];
    let out = run_aggregation(&providers, &DigestConfig::default(), NOW).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].item.title, "dated");
}
