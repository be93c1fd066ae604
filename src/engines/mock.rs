/*!
 * Mock engine implementations for testing.
 *
 * This module provides mock engines that simulate different behaviors:
 * - `MockEngine::healthy(text)` - Always succeeds with a fixed response
 * - `MockEngine::scripted(responses)` - Returns responses in sequence
 * - `MockEngine::failing()` - Always fails with a transport error
 * - `MockEngine::slow(text, delay)` - Succeeds after a delay
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::EngineError;
use crate::engines::TranslationEngine;

/// Behavior mode for the mock engine.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeeds with a fixed response
    Healthy(String),
    /// Returns responses in sequence, repeating the last one
    Scripted(Vec<String>),
    /// Always fails with a transport error
    Failing,
    /// Returns an empty response
    Empty,
    /// Succeeds with a fixed response after a delay
    Slow { text: String, delay_ms: u64 },
    /// Prepends leaked metadata to a fixed response
    Noisy { preamble: String, text: String },
    /// Fails the first `failures` calls, then succeeds with `text`
    FlakyStart { failures: usize, text: String },
}

/// Mock engine for testing gateway behavior.
#[derive(Debug)]
pub struct MockEngine {
    /// Stable identifier
    id: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of generate() calls received
    dispatch_count: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Create a mock engine with the given behavior.
    pub fn new(id: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            id: id.into(),
            behavior,
            dispatch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always succeeds with `text`.
    pub fn healthy(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, MockBehavior::Healthy(text.into()))
    }

    /// Returns `responses` in sequence, repeating the last.
    pub fn scripted(id: impl Into<String>, responses: Vec<String>) -> Self {
        Self::new(id, MockBehavior::Scripted(responses))
    }

    /// Always fails with a transport error.
    pub fn failing(id: impl Into<String>) -> Self {
        Self::new(id, MockBehavior::Failing)
    }

    /// Returns an empty response.
    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, MockBehavior::Empty)
    }

    /// Succeeds with `text` after `delay_ms` milliseconds.
    pub fn slow(id: impl Into<String>, text: impl Into<String>, delay_ms: u64) -> Self {
        Self::new(
            id,
            MockBehavior::Slow {
                text: text.into(),
                delay_ms,
            },
        )
    }

    /// Prepends `preamble` to `text`, simulating leaked metadata.
    pub fn noisy(id: impl Into<String>, preamble: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            id,
            MockBehavior::Noisy {
                preamble: preamble.into(),
                text: text.into(),
            },
        )
    }

    /// Fails the first `failures` calls, then succeeds with `text`.
    pub fn flaky_start(id: impl Into<String>, failures: usize, text: impl Into<String>) -> Self {
        Self::new(
            id,
            MockBehavior::FlakyStart {
                failures,
                text: text.into(),
            },
        )
    }

    /// Number of generate() calls this engine has received.
    pub fn dispatch_count(&self) -> usize {
        self.dispatch_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the dispatch counter, for assertions after the
    /// engine has been moved into the gateway.
    pub fn dispatch_counter(&self) -> Arc<AtomicUsize> {
        self.dispatch_count.clone()
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, _prompt: &str) -> Result<String, EngineError> {
        let call = self.dispatch_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Healthy(text) => Ok(text.clone()),
            MockBehavior::Scripted(responses) => {
                let index = call.min(responses.len().saturating_sub(1));
                responses
                    .get(index)
                    .cloned()
                    .ok_or(EngineError::EmptyResponse)
            }
            MockBehavior::Failing => Err(EngineError::ConnectionError(format!(
                "mock engine {} is down",
                self.id
            ))),
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Slow { text, delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(text.clone())
            }
            MockBehavior::Noisy { preamble, text } => Ok(format!("{}{}", preamble, text)),
            MockBehavior::FlakyStart { failures, text } => {
                if call < *failures {
                    Err(EngineError::ConnectionError(format!(
                        "mock engine {} warming up",
                        self.id
                    )))
                } else {
                    Ok(text.clone())
                }
            }
        }
    }
}
