/*!
 * Per-engine health tracking and circuit breaking.
 *
 * Engine-health state is process-wide and shared by all concurrent
 * requests, so it lives in one registry owned by the gateway, with each
 * engine's record behind its own mutex (single-writer discipline per
 * engine). The breaker opens after a configured run of consecutive
 * failures, admits exactly one half-open probe once the cooldown elapses,
 * and closes again on the next success.
 */

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;

/// Breaker state for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Engine is healthy and routable
    Closed,
    /// Engine is excluded from routing until the cooldown elapses
    Open,
    /// One probe attempt is in flight
    HalfOpen,
}

/// Health record for one engine.
#[derive(Debug, Clone)]
pub struct EngineHealth {
    /// Consecutive failures since the last success
    pub consecutive_failures: u32,
    /// Breaker state
    pub breaker: BreakerState,
    /// When the engine last failed
    pub last_failure: Option<Instant>,
}

impl Default for EngineHealth {
    fn default() -> Self {
        Self {
            consecutive_failures: 0,
            breaker: BreakerState::Closed,
            last_failure: None,
        }
    }
}

/// Breaker policy.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens
    pub max_consecutive_failures: u32,
    /// Cooldown before an open breaker admits a half-open probe
    pub half_open_after: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 3,
            half_open_after: Duration::from_millis(60_000),
        }
    }
}

/// Registry of health records for all configured engines.
pub struct HealthRegistry {
    records: HashMap<String, Mutex<EngineHealth>>,
    config: BreakerConfig,
}

impl HealthRegistry {
    /// Create a registry for the given engine ids.
    pub fn new<I, S>(engine_ids: I, config: BreakerConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = engine_ids
            .into_iter()
            .map(|id| (id.into(), Mutex::new(EngineHealth::default())))
            .collect();
        Self { records, config }
    }

    /// Whether a dispatch to this engine is admitted right now.
    ///
    /// Closed admits. Open admits only once the cooldown has elapsed, in
    /// which case the record transitions to half-open and this call admits
    /// the single probe. Half-open rejects: a probe is already in flight.
    pub fn admit(&self, engine_id: &str) -> bool {
        let Some(record) = self.records.get(engine_id) else {
            return false;
        };
        let mut health = record.lock();

        match health.breaker {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let cooled = health
                    .last_failure
                    .map(|t| t.elapsed() >= self.config.half_open_after)
                    .unwrap_or(true);
                if cooled {
                    debug!("engine {} breaker half-open, admitting probe", engine_id);
                    health.breaker = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a delivered response: failures reset, breaker closes.
    /// Delivery counts regardless of how the response is scored later.
    pub fn record_success(&self, engine_id: &str) {
        if let Some(record) = self.records.get(engine_id) {
            let mut health = record.lock();
            health.consecutive_failures = 0;
            health.breaker = BreakerState::Closed;
        }
    }

    /// Record a failed attempt. Returns true when this failure opened (or
    /// re-opened) the breaker.
    pub fn record_failure(&self, engine_id: &str) -> bool {
        let Some(record) = self.records.get(engine_id) else {
            return false;
        };
        let mut health = record.lock();
        health.consecutive_failures += 1;
        health.last_failure = Some(Instant::now());

        let should_open = health.breaker == BreakerState::HalfOpen
            || health.consecutive_failures >= self.config.max_consecutive_failures;

        if should_open && health.breaker != BreakerState::Open {
            warn!(
                "engine {} breaker opened after {} consecutive failures",
                engine_id, health.consecutive_failures
            );
        }
        if should_open {
            health.breaker = BreakerState::Open;
        }
        health.breaker == BreakerState::Open
    }

    /// A copy of the current record for one engine.
    pub fn snapshot(&self, engine_id: &str) -> Option<EngineHealth> {
        self.records.get(engine_id).map(|r| r.lock().clone())
    }
}
