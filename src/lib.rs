/*!
 * # tarjama - Pure Translation Pipeline for bilingual legal text
 *
 * A Rust library for translating short legal text fragments between Arabic
 * and French using unreliable third-party generative-AI engines, while
 * guaranteeing the returned text is monolingual and free of leaked
 * metadata.
 *
 * ## Features
 *
 * - Script analysis and configurable purity validation
 * - Ordered, idempotent content-cleaning rule pipeline
 * - Composite quality scoring (purity gate, structure, terminology)
 * - Statically pre-validated fallback content per domain and language
 * - Multi-engine routing with circuit breaking, caching, timeouts,
 *   concurrency limits, and cancellation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `script`: Character classification and script profiles
 * - `purity`: Zero-tolerance purity validation
 * - `cleaning`: Artifact removal and script-adjacency repair
 * - `quality`: Composite acceptance scoring
 * - `terminology`: Read-only terminology dictionary seam
 * - `fallback`: Guaranteed-pure placeholder content
 * - `engines`: Translation engine clients (remote and mock)
 * - `gateway`: The routing orchestrator and its cache/breaker state
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the pipeline
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod cleaning;
pub mod engines;
pub mod errors;
pub mod fallback;
pub mod gateway;
pub mod language;
pub mod purity;
pub mod quality;
pub mod script;
pub mod terminology;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cleaning::{CleanOutcome, ContentCleaner};
pub use errors::{EngineError, GatewayError};
pub use fallback::{DomainHint, FallbackCatalog};
pub use gateway::{RequestStatus, TranslationGateway, TranslationOutcome, TranslationRequest};
pub use language::Lang;
pub use purity::{PurityValidator, PurityVerdict};
pub use quality::{QualityScore, QualityScorer};
pub use script::{Script, ScriptProfile, analyze};
pub use terminology::{StaticTerminology, TerminologyDictionary};
