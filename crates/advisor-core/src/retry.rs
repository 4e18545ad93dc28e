//! Timeout and Retry Policy
//!
//! Every provider call crosses a network boundary. `ResilientProvider` wraps
//! any `LlmProvider` with a per-attempt deadline and exponential backoff on
//! retryable errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};

/// Upper bound for the delay between two attempts
pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Retry configuration
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry (doubles each retry)
    pub initial_backoff: Duration,

    /// Deadline for a single attempt
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `LLM_MAX_RETRIES` / `LLM_TIMEOUT_SECS`; unparsable values keep the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_retries = lookup("LLM_MAX_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);
        let timeout = lookup("LLM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            max_retries,
            timeout,
            ..defaults
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Provider decorator adding timeouts and backoff
pub struct ResilientProvider {
    inner: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl ResilientProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Doubled delay, capped at [`MAX_BACKOFF`]
    fn next_backoff(backoff: Duration) -> Duration {
        backoff.saturating_mul(2).min(MAX_BACKOFF)
    }

    async fn attempt(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        match tokio::time::timeout(self.policy.timeout, self.inner.complete(messages, options)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(self.policy.timeout_ms())),
        }
    }
}

#[async_trait]
impl LlmProvider for ResilientProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn health_check(&self) -> Result<bool> {
        match tokio::time::timeout(self.policy.timeout, self.inner.health_check()).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.attempt(messages, options).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        provider = self.inner.name(),
                        error = %e,
                        "LLM request failed, retrying in {:?} (attempt {}/{})",
                        backoff,
                        attempt,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = Self::next_backoff(backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.inner.list_models().await
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        self.inner.estimate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls with the given error kind
    struct FlakyProvider {
        failures: usize,
        retryable: bool,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failures: usize, retryable: bool) -> Self {
            Self {
                failures,
                retryable,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, _: &[Message], options: &GenerationOptions) -> Result<Completion> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(if self.retryable {
                    AgentError::ProviderUnavailable("503".into())
                } else {
                    AgentError::Auth("401".into())
                });
            }
            Ok(Completion::text("{}", options.model.clone()))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, _: &[Message], options: &GenerationOptions) -> Result<Completion> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(Completion::text("late", options.model.clone()))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    fn messages() -> Vec<Message> {
        vec![Message::user("hi")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let inner = Arc::new(FlakyProvider::new(2, true));
        let provider = ResilientProvider::new(inner.clone(), RetryPolicy::default());

        let result = provider.complete(&messages(), &GenerationOptions::default()).await;
        assert!(result.is_ok());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let inner = Arc::new(FlakyProvider::new(10, true));
        let provider = ResilientProvider::new(inner.clone(), RetryPolicy::default());

        let result = provider.complete(&messages(), &GenerationOptions::default()).await;
        assert!(matches!(result, Err(AgentError::ProviderUnavailable(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_permanent_errors() {
        let inner = Arc::new(FlakyProvider::new(1, false));
        let provider = ResilientProvider::new(inner.clone(), RetryPolicy::default());

        let result = provider.complete(&messages(), &GenerationOptions::default()).await;
        assert!(matches!(result, Err(AgentError::Auth(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_deadline() {
        let policy = RetryPolicy {
            max_retries: 0,
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let provider = ResilientProvider::new(Arc::new(SlowProvider), policy);

        let result = provider.complete(&messages(), &GenerationOptions::default()).await;
        assert!(matches!(result, Err(AgentError::Timeout(5000))));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(ResilientProvider::next_backoff(Duration::from_millis(250)), Duration::from_millis(500));
        assert_eq!(ResilientProvider::next_backoff(Duration::from_secs(8)), MAX_BACKOFF);
        assert_eq!(ResilientProvider::next_backoff(Duration::MAX), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_retries_stay_bounded() {
        let inner = Arc::new(FlakyProvider::new(60, true));
        let policy = RetryPolicy {
            max_retries: 60,
            ..Default::default()
        };
        let provider = ResilientProvider::new(inner.clone(), policy);

        let started = tokio::time::Instant::now();
        let result = provider.complete(&messages(), &GenerationOptions::default()).await;
        assert!(result.is_ok());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 61);
        assert!(started.elapsed() <= MAX_BACKOFF * 60);
    }

    #[test]
    fn test_policy_from_lookup() {
        let policy = RetryPolicy::from_lookup(|key| match key {
            "LLM_MAX_RETRIES" => Some("4".into()),
            "LLM_TIMEOUT_SECS" => Some("soon".into()),
            _ => None,
        });
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }
}
