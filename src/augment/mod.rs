// src/augment/mod.rs
pub mod client;
pub mod extract;
pub mod merge;
pub mod prompt;

pub use client::{GenerationClient, GenerationError};
pub use extract::{extract_results, ExtractError};
pub use merge::{merge, Enrichment, NewsItem};
pub use prompt::build_prompt;
