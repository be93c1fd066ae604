/*!
 * Zero-tolerance purity validation.
 *
 * Applies configurable thresholds to a script profile and produces an
 * immutable pass/fail verdict. "Zero tolerance" is interpreted as the
 * default 95%/5% policy over meaningful characters, not a literal ban on
 * every foreign code point: digits and punctuation are neutral, and a
 * single stray proper noun must not reject an otherwise valid fragment.
 */

use serde::{Deserialize, Serialize};

use crate::language::Lang;
use crate::script::{Script, ScriptProfile};

/// Thresholds applied by the validator, in percent.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PurityThresholds {
    /// Minimum share of the target script among meaningful characters
    #[serde(default = "default_target_min_pct")]
    pub target_min_pct: f64,

    /// Maximum share of foreign (non-target) meaningful characters
    #[serde(default = "default_foreign_max_pct")]
    pub foreign_max_pct: f64,
}

fn default_target_min_pct() -> f64 {
    95.0
}

fn default_foreign_max_pct() -> f64 {
    5.0
}

impl Default for PurityThresholds {
    fn default() -> Self {
        Self {
            target_min_pct: default_target_min_pct(),
            foreign_max_pct: default_foreign_max_pct(),
        }
    }
}

/// Why a verdict failed.
#[derive(Debug, Clone, PartialEq)]
pub enum PurityViolation {
    /// Foreign-script characters exceed the threshold
    ForeignScript {
        /// The dominant foreign script family detected, if classifiable
        dominant: Option<Script>,
        /// Foreign share in percent
        foreign_pct: f64,
    },
    /// The text contains no meaningful script characters at all
    NoScriptContent,
}

impl std::fmt::Display for PurityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignScript { dominant, foreign_pct } => match dominant {
                Some(script) => {
                    write!(f, "foreign script {} at {:.1}%", script, foreign_pct)
                }
                None => write!(f, "unclassified script content at {:.1}%", foreign_pct),
            },
            Self::NoScriptContent => write!(f, "no meaningful script content"),
        }
    }
}

/// Pass/fail judgement on a script profile. Computed once per attempt,
/// never mutated.
#[derive(Debug, Clone)]
pub struct PurityVerdict {
    /// Whether the profile satisfies the thresholds
    pub pass: bool,
    /// Target-script share in percent
    pub target_pct: f64,
    /// Foreign share in percent
    pub foreign_pct: f64,
    /// Violation detail when the verdict failed
    pub violation: Option<PurityViolation>,
}

/// Purity validator. Deterministic and side-effect-free.
#[derive(Debug, Clone, Default)]
pub struct PurityValidator {
    thresholds: PurityThresholds,
}

impl PurityValidator {
    /// Create a validator with custom thresholds.
    pub fn with_thresholds(thresholds: PurityThresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds in force.
    pub fn thresholds(&self) -> PurityThresholds {
        self.thresholds
    }

    /// Validate a profile against the declared target language.
    pub fn validate(&self, profile: &ScriptProfile, target: Lang) -> PurityVerdict {
        if profile.meaningful() == 0 {
            return PurityVerdict {
                pass: false,
                target_pct: 0.0,
                foreign_pct: 0.0,
                violation: Some(PurityViolation::NoScriptContent),
            };
        }

        let target_pct = profile.target_share(target);
        let foreign_pct = profile.foreign_share(target);
        let pass = target_pct >= self.thresholds.target_min_pct
            && foreign_pct <= self.thresholds.foreign_max_pct;

        let violation = if pass {
            None
        } else {
            Some(PurityViolation::ForeignScript {
                dominant: profile.dominant_foreign(target),
                foreign_pct,
            })
        };

        PurityVerdict {
            pass,
            target_pct,
            foreign_pct,
            violation,
        }
    }

    /// Convenience: analyze raw text and validate the resulting profile.
    pub fn validate_text(&self, text: &str, target: Lang) -> PurityVerdict {
        self.validate(&crate::script::analyze(text), target)
    }
}
