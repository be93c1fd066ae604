/*!
 * Translation engine implementations.
 *
 * Engines are unreliable black boxes: the gateway only assumes the
 * capability `generate(prompt) -> text`. Any error, empty, or non-text
 * response is a transport failure handled by routing, never by the caller.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::EngineError;

/// Common trait for all translation engines.
///
/// Implementations must be cheap to share across concurrent requests; the
/// gateway holds them behind `Arc` and dispatches strictly sequentially
/// within one request.
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Stable identifier used in diagnostics and breaker bookkeeping.
    fn id(&self) -> &str;

    /// Generate a completion for the given prompt.
    ///
    /// # Returns
    /// * `Result<String, EngineError>` - The raw engine output, or a
    ///   transport-level error
    async fn generate(&self, prompt: &str) -> Result<String, EngineError>;
}

pub mod mock;
pub mod remote;

pub use mock::{MockBehavior, MockEngine};
pub use remote::RemoteEngine;
