/*!
 * Translation gateway: routing, circuit breaking, caching, and the
 * per-request state machine.
 *
 * The gateway composes every other pipeline component:
 * - `cache`: bounded TTL result cache
 * - `health`: per-engine circuit-breaker registry
 * - `orchestrator`: the request state machine and routing loop
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::fallback::DomainHint;
use crate::language::Lang;

pub mod cache;
pub mod health;
pub mod orchestrator;

pub use cache::ResultCache;
pub use health::{BreakerConfig, BreakerState, EngineHealth, HealthRegistry};
pub use orchestrator::TranslationGateway;

/// One caller-initiated translation job.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Source text fragment
    pub text: String,
    /// Declared source language
    pub source: Lang,
    /// Declared target language
    pub target: Lang,
    /// Domain hint selecting terminology and fallback template
    pub domain: DomainHint,
    /// Correlation id for cancellation and tracing
    pub correlation_id: Uuid,
    /// Optional overall budget; on expiry remaining engines are skipped
    pub deadline: Option<Duration>,
}

impl TranslationRequest {
    /// Create a request with a fresh correlation id and defaults.
    pub fn new(text: impl Into<String>, source: Lang, target: Lang) -> Self {
        Self {
            text: text.into(),
            source,
            target,
            domain: DomainHint::default(),
            correlation_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    /// Set the domain hint.
    pub fn with_domain(mut self, domain: DomainHint) -> Self {
        self.domain = domain;
        self
    }

    /// Set an explicit correlation id.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Set an overall request budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Terminal status of a request.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// An engine produced an accepted translation
    Accepted,
    /// All engines exhausted; a pre-validated placeholder was returned
    Fallback,
    /// The cleaned source was too short to be worth dispatching
    Skipped,
    /// The caller cancelled the request mid-flight
    Cancelled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Fallback => write!(f, "fallback"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of one engine attempt.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Network failure, timeout, or malformed/empty response
    Transport {
        /// Failure description
        reason: String,
    },
    /// Response scored below the acceptance threshold
    QualityRejected {
        /// Composite score
        score: f64,
        /// Whether the purity gate passed
        purity_pass: bool,
    },
    /// Response accepted
    Accepted {
        /// Composite score
        score: f64,
    },
}

/// One engine call within a request. Immutable once recorded.
#[derive(Debug, Serialize, Clone)]
pub struct TranslationAttempt {
    /// Engine that was dispatched
    pub engine_id: String,
    /// What happened
    pub outcome: AttemptOutcome,
    /// Wall-clock latency of the attempt in milliseconds
    pub latency_ms: u64,
    /// When the attempt was recorded
    pub recorded_at: DateTime<Utc>,
}

impl TranslationAttempt {
    /// Record an attempt now.
    pub fn record(engine_id: &str, outcome: AttemptOutcome, latency: Duration) -> Self {
        Self {
            engine_id: engine_id.to_string(),
            outcome,
            latency_ms: latency.as_millis() as u64,
            recorded_at: Utc::now(),
        }
    }
}

/// Final response to the caller: always some text and an explicit status,
/// with every attempt aggregated as diagnostics.
#[derive(Debug, Serialize, Clone)]
pub struct TranslationOutcome {
    /// Returned text (accepted translation, fallback notice, or cleaned
    /// source for skipped/cancelled requests)
    pub text: String,
    /// Terminal status
    pub status: RequestStatus,
    /// Engine attempts, in dispatch order
    pub attempts: Vec<TranslationAttempt>,
}
