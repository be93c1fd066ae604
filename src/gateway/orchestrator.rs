/*!
 * Translation orchestrator: the per-request state machine.
 *
 * A request flows `Dispatching(i) -> Validating -> {Accepted, NextEngine,
 * Fallback, Skipped, Cancelled}` over the ranked engine list. Engine
 * flakiness is recovered locally by advancing to the next engine and is
 * only ever surfaced as aggregated attempt diagnostics; the caller always
 * receives some text and an explicit status.
 *
 * Engines are tried strictly sequentially per request, never retried within
 * one request, bounded by a per-engine timeout, and filtered through the
 * circuit-breaker registry. A global semaphore caps simultaneous in-flight
 * engine calls; waiters queue FIFO up to a bounded depth.
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::RwLock;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use uuid::Uuid;

use crate::app_config::PipelineSettings;
use crate::cleaning::ContentCleaner;
use crate::engines::TranslationEngine;
use crate::errors::GatewayError;
use crate::fallback::FallbackCatalog;
use crate::language::Lang;
use crate::purity::{PurityThresholds, PurityValidator};
use crate::quality::QualityScorer;
use crate::script::analyze;
use crate::terminology::TerminologyDictionary;

use super::cache::ResultCache;
use super::health::{BreakerConfig, HealthRegistry};
use super::{AttemptOutcome, RequestStatus, TranslationAttempt, TranslationOutcome, TranslationRequest};

/// Per-request state machine steps.
enum Step {
    /// Try the engine at this rank
    Dispatching(usize),
    /// An engine answered; clean, validate, and score the raw response
    Validating {
        index: usize,
        raw: String,
        latency: Duration,
    },
    /// Terminal
    Done(RequestStatus, String),
}

/// The translation gateway. One instance safely serves many concurrent
/// requests; all shared mutable state (breakers, cache, cancellation set)
/// is internally synchronized.
pub struct TranslationGateway {
    /// Engines in priority order
    engines: Vec<Arc<dyn TranslationEngine>>,
    health: HealthRegistry,
    cache: ResultCache,
    cleaner: ContentCleaner,
    validator: PurityValidator,
    scorer: QualityScorer,
    fallback: FallbackCatalog,
    settings: PipelineSettings,
    /// Caps simultaneous in-flight engine calls across all requests
    semaphore: Arc<Semaphore>,
    /// Requests currently waiting for a permit
    queued: AtomicUsize,
    /// Correlation ids flagged for cancellation
    cancelled: RwLock<HashSet<Uuid>>,
}

impl TranslationGateway {
    /// Build a gateway over the given engines and terminology dictionary.
    ///
    /// Validates the fallback catalog against the configured purity
    /// thresholds; a failing template is a fatal configuration fault and
    /// the gateway is not constructed.
    pub fn new(
        engines: Vec<Arc<dyn TranslationEngine>>,
        dictionary: Arc<dyn TerminologyDictionary>,
        settings: PipelineSettings,
    ) -> Result<Self, GatewayError> {
        if engines.is_empty() {
            return Err(GatewayError::ConfigurationFault(
                "at least one engine must be configured".to_string(),
            ));
        }

        let validator = PurityValidator::with_thresholds(PurityThresholds {
            target_min_pct: settings.purity_target_threshold_pct,
            foreign_max_pct: settings.purity_foreign_threshold_pct,
        });
        let fallback = FallbackCatalog::new(&validator)?;

        let health = HealthRegistry::new(
            engines.iter().map(|e| e.id().to_string()),
            BreakerConfig {
                max_consecutive_failures: settings.max_consecutive_failures_before_open,
                half_open_after: Duration::from_millis(settings.circuit_half_open_after_ms),
            },
        );
        let cache = ResultCache::new(
            Duration::from_millis(settings.cache_ttl_ms),
            settings.cache_max_entries,
        );
        let semaphore = Arc::new(Semaphore::new(settings.global_concurrency_limit));

        Ok(Self {
            engines,
            health,
            cache,
            cleaner: ContentCleaner::new(),
            validator,
            scorer: QualityScorer::new(dictionary),
            fallback,
            settings,
            semaphore,
            queued: AtomicUsize::new(0),
            cancelled: RwLock::new(HashSet::new()),
        })
    }

    /// Flag a request for cancellation. Takes effect at the next
    /// suspension point; a response already in flight is discarded on
    /// return.
    pub fn cancel(&self, correlation_id: Uuid) {
        self.cancelled.write().insert(correlation_id);
        info!("request {} flagged for cancellation", correlation_id);
    }

    /// Cache statistics: (hits, misses, hit rate).
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.cache.stats()
    }

    /// Health snapshot for one engine, for diagnostics.
    pub fn engine_health(&self, engine_id: &str) -> Option<super::EngineHealth> {
        self.health.snapshot(engine_id)
    }

    /// Translate one request through the pipeline.
    ///
    /// The only error surfaced here is `CapacityExceeded`; every engine
    /// failure is recovered by routing and aggregated into the outcome's
    /// attempt diagnostics.
    pub async fn translate(&self, request: TranslationRequest) -> Result<TranslationOutcome, GatewayError> {
        // Fresh cache entries short-circuit everything, including the
        // concurrency gate: no engine dispatch happens.
        if let Some(text) = self.cache.get(&request.text, request.source, request.target) {
            debug!("request {} served from cache", request.correlation_id);
            self.forget(request.correlation_id);
            return Ok(TranslationOutcome {
                text,
                status: RequestStatus::Accepted,
                attempts: Vec::new(),
            });
        }

        let _permit = self.acquire_slot().await?;
        let outcome = self.run_state_machine(&request).await;
        self.forget(request.correlation_id);
        Ok(outcome)
    }

    /// Acquire an in-flight slot, queueing FIFO up to the configured depth.
    async fn acquire_slot(&self) -> Result<OwnedSemaphorePermit, GatewayError> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Ok(permit),
            Err(TryAcquireError::NoPermits) => {
                let waiting = self.queued.fetch_add(1, Ordering::SeqCst);
                // Held across the await so even a caller that drops the
                // waiting future releases its queue slot.
                let _waiter = QueueWaiter(&self.queued);
                if waiting >= self.settings.max_queue_depth {
                    return Err(GatewayError::CapacityExceeded(format!(
                        "queue depth {} reached",
                        self.settings.max_queue_depth
                    )));
                }
                self.semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| {
                        GatewayError::CapacityExceeded("gateway is shutting down".to_string())
                    })
            }
            Err(TryAcquireError::Closed) => Err(GatewayError::CapacityExceeded(
                "gateway is shutting down".to_string(),
            )),
        }
    }

    /// Drive one request to a terminal state.
    async fn run_state_machine(&self, request: &TranslationRequest) -> TranslationOutcome {
        let started = Instant::now();
        let mut attempts: Vec<TranslationAttempt> = Vec::new();

        // Pre-clean the source so engines and the cache key downstream of
        // dispatch see normalized input.
        let pre = self.cleaner.clean(&request.text);
        if !pre.fired.is_empty() {
            debug!("pre-clean fired rules {:?}", pre.fired);
        }

        if analyze(&pre.text).meaningful() < self.settings.min_input_chars {
            debug!("request {} skipped: below minimum meaningful length", request.correlation_id);
            return TranslationOutcome {
                text: pre.text,
                status: RequestStatus::Skipped,
                attempts,
            };
        }

        let prompt = self.build_prompt(&pre.text, request.source, request.target);
        let timeout = Duration::from_millis(self.settings.engine_timeout_ms);

        let mut step = Step::Dispatching(0);
        loop {
            step = match step {
                Step::Dispatching(index) => {
                    if self.is_cancelled(request.correlation_id) {
                        Step::Done(RequestStatus::Cancelled, pre.text.clone())
                    } else if index >= self.engines.len() || self.deadline_expired(request, started) {
                        // Engines exhausted (or out of budget): synthesize
                        // the pre-validated fallback notice.
                        let text = self.fallback.generate(request.target, request.domain).to_string();
                        Step::Done(RequestStatus::Fallback, text)
                    } else {
                        let engine = &self.engines[index];
                        if !self.health.admit(engine.id()) {
                            debug!("engine {} skipped: breaker open", engine.id());
                            Step::Dispatching(index + 1)
                        } else {
                            match self.dispatch(engine.as_ref(), &prompt, timeout).await {
                                Ok((raw, latency)) => {
                                    // The breaker tracks transport health only:
                                    // any delivered response counts as a success,
                                    // even if scoring later rejects it. A
                                    // half-open probe must never be left dangling.
                                    self.health.record_success(engine.id());
                                    if self.is_cancelled(request.correlation_id) {
                                        // In-flight result discarded on return
                                        Step::Done(RequestStatus::Cancelled, pre.text.clone())
                                    } else {
                                        Step::Validating { index, raw, latency }
                                    }
                                }
                                Err((reason, latency)) => {
                                    warn!("engine {} transport failure: {}", engine.id(), reason);
                                    attempts.push(TranslationAttempt::record(
                                        engine.id(),
                                        AttemptOutcome::Transport { reason },
                                        latency,
                                    ));
                                    self.health.record_failure(engine.id());
                                    Step::Dispatching(index + 1)
                                }
                            }
                        }
                    }
                }
                Step::Validating { index, raw, latency } => {
                    let engine = &self.engines[index];
                    let post = self.cleaner.clean(&raw);
                    if !post.fired.is_empty() {
                        debug!("post-clean of engine {} fired rules {:?}", engine.id(), post.fired);
                    }

                    // Purity is computed on the cleaned text, never the raw
                    // response.
                    let verdict = self.validator.validate(&analyze(&post.text), request.target);
                    let score = self.scorer.score(
                        &pre.text,
                        &post.text,
                        &verdict,
                        request.domain,
                        request.source,
                        request.target,
                    );

                    if score.total >= self.settings.acceptance_score_threshold {
                        attempts.push(TranslationAttempt::record(
                            engine.id(),
                            AttemptOutcome::Accepted { score: score.total },
                            latency,
                        ));
                        self.cache
                            .store(&request.text, request.source, request.target, &post.text);
                        info!(
                            "request {} accepted via engine {} (score {:.1})",
                            request.correlation_id,
                            engine.id(),
                            score.total
                        );
                        Step::Done(RequestStatus::Accepted, post.text)
                    } else {
                        debug!(
                            "engine {} rejected: score {:.1} (purity pass: {})",
                            engine.id(),
                            score.total,
                            score.purity_gate
                        );
                        attempts.push(TranslationAttempt::record(
                            engine.id(),
                            AttemptOutcome::QualityRejected {
                                score: score.total,
                                purity_pass: score.purity_gate,
                            },
                            latency,
                        ));
                        Step::Dispatching(index + 1)
                    }
                }
                Step::Done(status, text) => {
                    return TranslationOutcome { text, status, attempts };
                }
            };
        }
    }

    /// Dispatch one bounded engine call. Timeouts and engine errors both
    /// come back as transport failures with the measured latency.
    async fn dispatch(
        &self,
        engine: &dyn TranslationEngine,
        prompt: &str,
        timeout: Duration,
    ) -> Result<(String, Duration), (String, Duration)> {
        let start = Instant::now();
        match tokio::time::timeout(timeout, engine.generate(prompt)).await {
            Ok(Ok(raw)) => {
                if raw.trim().is_empty() {
                    Err(("empty response".to_string(), start.elapsed()))
                } else {
                    Ok((raw, start.elapsed()))
                }
            }
            Ok(Err(e)) => Err((e.to_string(), start.elapsed())),
            Err(_) => Err((
                format!("timed out after {} ms", timeout.as_millis()),
                start.elapsed(),
            )),
        }
    }

    fn build_prompt(&self, text: &str, source: Lang, target: Lang) -> String {
        format!(
            "You are a professional legal translator. Translate the following text from {} to {}. \
             Respond with the translated text only, written entirely in {}, \
             without any explanations, notes, labels, or text in another language.\n\n{}",
            source.display_name(),
            target.display_name(),
            target.display_name(),
            text
        )
    }

    fn is_cancelled(&self, correlation_id: Uuid) -> bool {
        self.cancelled.read().contains(&correlation_id)
    }

    fn forget(&self, correlation_id: Uuid) {
        self.cancelled.write().remove(&correlation_id);
    }

    fn deadline_expired(&self, request: &TranslationRequest, started: Instant) -> bool {
        request
            .deadline
            .map(|budget| started.elapsed() >= budget)
            .unwrap_or(false)
    }
}

/// Releases a queue slot when dropped, including when the waiting future is
/// cancelled before a permit arrives.
struct QueueWaiter<'a>(&'a AtomicUsize);

impl Drop for QueueWaiter<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
