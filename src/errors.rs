/*!
 * Error types for the tarjama translation gateway.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when calling an external translation engine.
///
/// Every variant is treated by the orchestrator as a transport failure:
/// the attempt is recorded, the engine's failure counter is incremented,
/// and routing advances to the next engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error when sending the request to the engine
    #[error("engine request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing the engine response
    #[error("failed to parse engine response: {0}")]
    ParseError(String),

    /// Error returned by the engine API itself
    #[error("engine API error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Engine did not answer within the configured timeout
    #[error("engine timed out after {0} ms")]
    Timeout(u64),

    /// Engine returned an empty or whitespace-only response
    #[error("engine returned an empty response")]
    EmptyResponse,
}

/// Errors surfaced by the translation gateway itself.
///
/// Ordinary engine flakiness never reaches the caller as an error; it is
/// aggregated into attempt diagnostics on the final outcome. These variants
/// cover the cases that genuinely must stop or reject a request.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A fallback template or static configuration failed its own startup
    /// check. Fatal: the gateway must not be constructed.
    #[error("configuration fault: {0}")]
    ConfigurationFault(String),

    /// The request queue is full under the global concurrency limit.
    /// Retryable; the caller should back off and resubmit.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The request itself is malformed (unknown language code, etc.)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<anyhow::Error> for GatewayError {
    fn from(error: anyhow::Error) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}
