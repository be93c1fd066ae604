/*!
 * Composite quality scoring for cleaned candidate translations.
 *
 * Purity is a hard gate: a failed verdict forces the score to zero. Past
 * the gate, the score blends structural fidelity (output/input length
 * ratio) with terminology consistency (domain terms present in the source
 * that have a recognized counterpart in the output).
 */

use std::sync::Arc;

use log::debug;

use crate::fallback::DomainHint;
use crate::language::Lang;
use crate::purity::PurityVerdict;
use crate::terminology::TerminologyDictionary;

/// Length-ratio band that scores full marks.
const RATIO_BAND_LOW: f64 = 0.4;
const RATIO_BAND_HIGH: f64 = 2.5;
/// Ratio at which an oversized output scores zero.
const RATIO_ZERO_HIGH: f64 = 5.0;

/// Relative weights of the two sub-scores.
const STRUCTURAL_WEIGHT: f64 = 0.6;
const TERMINOLOGY_WEIGHT: f64 = 0.4;

/// Composite acceptance score for one attempt. Computed once, never
/// mutated.
#[derive(Debug, Clone, Copy)]
pub struct QualityScore {
    /// Overall score, 0-100
    pub total: f64,
    /// Whether the purity gate passed
    pub purity_gate: bool,
    /// Structural-fidelity sub-score, 0-100
    pub structural: f64,
    /// Terminology-consistency sub-score, 0-100
    pub terminology: f64,
}

impl QualityScore {
    /// The zero score produced by a failed purity gate.
    fn gated() -> Self {
        Self {
            total: 0.0,
            purity_gate: false,
            structural: 0.0,
            terminology: 0.0,
        }
    }
}

/// Quality scorer over a read-only terminology collaborator.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    dictionary: Arc<dyn TerminologyDictionary>,
}

impl QualityScorer {
    /// Create a scorer over the given dictionary.
    pub fn new(dictionary: Arc<dyn TerminologyDictionary>) -> Self {
        Self { dictionary }
    }

    /// Score a cleaned candidate against its source text.
    pub fn score(
        &self,
        source_text: &str,
        candidate: &str,
        verdict: &PurityVerdict,
        domain: DomainHint,
        source_lang: Lang,
        target_lang: Lang,
    ) -> QualityScore {
        if !verdict.pass {
            return QualityScore::gated();
        }

        let structural = structural_fidelity(source_text, candidate);
        let terminology = self.terminology_consistency(source_text, candidate, domain, source_lang, target_lang);
        let total = STRUCTURAL_WEIGHT * structural + TERMINOLOGY_WEIGHT * terminology;

        debug!(
            "quality score {:.1} (structural {:.1}, terminology {:.1})",
            total, structural, terminology
        );

        QualityScore {
            total,
            purity_gate: true,
            structural,
            terminology,
        }
    }

    /// Fraction of domain terms present in the source whose target-language
    /// counterpart appears in the candidate. Vacuously full marks when the
    /// source contains no known terms.
    fn terminology_consistency(
        &self,
        source_text: &str,
        candidate: &str,
        domain: DomainHint,
        source_lang: Lang,
        target_lang: Lang,
    ) -> f64 {
        let pairs = self.dictionary.terms_for(domain, source_lang, target_lang);
        let source_lower = source_text.to_lowercase();
        let candidate_lower = candidate.to_lowercase();

        let mut present = 0usize;
        let mut matched = 0usize;
        for pair in &pairs {
            if source_lower.contains(&pair.source.to_lowercase()) {
                present += 1;
                if candidate_lower.contains(&pair.target.to_lowercase()) {
                    matched += 1;
                }
            }
        }

        if present == 0 {
            100.0
        } else {
            matched as f64 * 100.0 / present as f64
        }
    }
}

/// Structural fidelity from the output/input character-length ratio.
/// Full marks inside [0.4, 2.5]; degrades linearly to zero outside the
/// band (at ratio 0 below, at ratio 5.0 above).
fn structural_fidelity(source_text: &str, candidate: &str) -> f64 {
    let source_len = source_text.chars().count();
    let candidate_len = candidate.chars().count();
    if source_len == 0 || candidate_len == 0 {
        return 0.0;
    }

    let ratio = candidate_len as f64 / source_len as f64;
    if (RATIO_BAND_LOW..=RATIO_BAND_HIGH).contains(&ratio) {
        100.0
    } else if ratio < RATIO_BAND_LOW {
        ratio / RATIO_BAND_LOW * 100.0
    } else {
        ((RATIO_ZERO_HIGH - ratio) / (RATIO_ZERO_HIGH - RATIO_BAND_HIGH)).max(0.0) * 100.0
    }
}
