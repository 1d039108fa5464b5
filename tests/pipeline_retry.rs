// tests/pipeline_retry.rs
//
// Retry policy at the generation boundary: overload is retried with the
// exponential schedule, everything else fails fast.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use ai_news_digest::augment::client::{GenerationClient, GenerationError};
use ai_news_digest::config::Backoff;
use ai_news_digest::pipeline::{generate_with_retry, PipelineError};

/// Counts calls and answers with a fixed behavior.
struct ScriptedClient {
    calls: AtomicU32,
    behavior: Behavior,
}

enum Behavior {
    AlwaysOverloaded,
    AlwaysOk(&'static str),
    OverloadedThenOk(u32, &'static str),
    Unauthorized,
}

impl ScriptedClient {
    fn new(behavior: Behavior) -> Self {
        Self {
            calls: AtomicU32::new(0),
            behavior,
        }
    }
    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.behavior {
            Behavior::AlwaysOverloaded => {
                Err(GenerationError::Overloaded("model is overloaded".into()))
            }
            Behavior::AlwaysOk(text) => Ok(text.to_string()),
            Behavior::OverloadedThenOk(failures, text) => {
                if n <= *failures {
                    Err(GenerationError::Overloaded("model is overloaded".into()))
                } else {
                    Ok(text.to_string())
                }
            }
            Behavior::Unauthorized => Err(GenerationError::Api {
                status: 401,
                body: "invalid key".into(),
            }),
        }
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[tokio::test]
async fn overload_is_retried_exactly_three_times() {
    let client = ScriptedClient::new(Behavior::AlwaysOverloaded);
    let out = generate_with_retry(&client, "p", 3, &Backoff::none()).await;
    assert_eq!(client.calls(), 3);
    match out {
        Err(PipelineError::Overloaded { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected Overloaded, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_sleep_the_full_exponential_schedule() {
    // With paused time the sleeps complete instantly but still advance the
    // clock, so the total must be exactly 2 + 4 + 8 seconds.
    let client = ScriptedClient::new(Behavior::AlwaysOverloaded);
    let t0 = tokio::time::Instant::now();
    let out = generate_with_retry(&client, "p", 3, &Backoff::exponential()).await;
    assert!(matches!(out, Err(PipelineError::Overloaded { .. })));
    assert_eq!(t0.elapsed(), Duration::from_secs(14));
}

#[tokio::test(start_paused = true)]
async fn recovery_after_one_overload_waits_only_the_first_delay() {
    let client = ScriptedClient::new(Behavior::OverloadedThenOk(1, "text"));
    let t0 = tokio::time::Instant::now();
    let out = generate_with_retry(&client, "p", 3, &Backoff::exponential()).await;
    assert_eq!(out.unwrap(), "text");
    assert_eq!(client.calls(), 2);
    assert_eq!(t0.elapsed(), Duration::from_secs(2));
}

#[tokio::test]
async fn success_on_first_attempt_makes_one_call() {
    let client = ScriptedClient::new(Behavior::AlwaysOk("hello"));
    let out = generate_with_retry(&client, "p", 3, &Backoff::none()).await;
    assert_eq!(out.unwrap(), "hello");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn non_retryable_failure_makes_one_call() {
    let client = ScriptedClient::new(Behavior::Unauthorized);
    let out = generate_with_retry(&client, "p", 3, &Backoff::none()).await;
    assert_eq!(client.calls(), 1);
    match out {
        Err(PipelineError::Generation(GenerationError::Api { status, .. })) => {
            assert_eq!(status, 401)
        }
        other => panic!("expected Generation(Api), got {other:?}"),
    }
}

#[tokio::test]
async fn overloaded_error_is_marked_retryable() {
    let client = ScriptedClient::new(Behavior::AlwaysOverloaded);
    let err = generate_with_retry(&client, "p", 3, &Backoff::none())
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    let client = ScriptedClient::new(Behavior::Unauthorized);
    let err = generate_with_retry(&client, "p", 3, &Backoff::none())
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
}
