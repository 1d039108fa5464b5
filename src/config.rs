// src/config.rs
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";
const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";

/// One configured syndication endpoint. The display name carries a trailing
/// " AI" token that the merge step strips for presentation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Inter-attempt delays for the generation retry loop. The schedule is plain
/// data so tests can substitute zero delays.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub delays: Vec<Duration>,
}

impl Backoff {
    /// 2^k seconds after failed attempt k: 2s, 4s, 8s.
    pub fn exponential() -> Self {
        Self {
            delays: vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ],
        }
    }

    pub fn none() -> Self {
        Self { delays: Vec::new() }
    }

    /// Delay to wait after the failed attempt with 1-based number `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.delays
            .get(attempt.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::exponential()
    }
}

fn default_window_hours() -> u64 {
    48
}
fn default_per_source_limit() -> usize {
    3
}
fn default_max_items() -> usize {
    3
}
fn default_max_attempts() -> u32 {
    3
}

/// Pipeline policy: feed list, recency window, truncation caps, retry budget.
/// Loaded from TOML; every field has a sane default so a partial file works.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub feeds: Vec<FeedSource>,
    pub window_hours: u64,
    pub per_source_limit: usize,
    pub max_items: usize,
    pub max_attempts: u32,
    #[serde(skip)]
    pub backoff: Backoff,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            window_hours: default_window_hours(),
            per_source_limit: default_per_source_limit(),
            max_items: default_max_items(),
            max_attempts: default_max_attempts(),
            backoff: Backoff::exponential(),
        }
    }
}

impl DigestConfig {
    /// Load config from an explicit TOML path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading digest config from {}", path.display()))?;
        let mut cfg: DigestConfig = toml::from_str(&content)
            .with_context(|| format!("parsing digest config {}", path.display()))?;
        if cfg.feeds.is_empty() {
            cfg.feeds = default_feeds();
        }
        Ok(cfg)
    }

    /// Load config using env var + fallbacks:
    /// 1) $NEWS_FEEDS_PATH
    /// 2) config/feeds.toml
    /// 3) compiled-in defaults
    /// An explicitly configured path that is missing or unusable falls back
    /// to defaults with a warning; a broken config file must not keep the
    /// service from starting. Absence of the default file is normal and
    /// silent.
    pub fn load_default() -> Self {
        if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
            return Self::load_or_default(Path::new(&p));
        }
        let default_path = Path::new(DEFAULT_FEEDS_PATH);
        if !default_path.exists() {
            return Self::default();
        }
        Self::load_or_default(default_path)
    }

    /// Defaults (with a warning) when `path` is missing or unparsable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "feed config path does not exist, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = ?e, path = %path.display(), "feed config unusable, using defaults");
                Self::default()
            }
        }
    }
}

/// Compiled-in feed list, used when no config file is present.
fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "TechCrunch AI",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
        FeedSource::new(
            "The Verge AI",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
        ),
        FeedSource::new("VentureBeat AI", "https://venturebeat.com/category/ai/feed/"),
        FeedSource::new(
            "MIT Technology Review AI",
            "https://www.technologyreview.com/topic/artificial-intelligence/feed",
        ),
    ]
}
