// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod augment;
pub mod config;
pub mod metrics;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::augment::client::{GenerationClient, GenerationError};
pub use crate::augment::merge::NewsItem;
pub use crate::config::{DigestConfig, FeedSource};
pub use crate::pipeline::PipelineError;
