/*!
 * Built-in legal terminology dictionary.
 *
 * The quality scorer consumes terminology through the read-only
 * `TerminologyDictionary` trait; the real dictionary is an external
 * collaborator. This module ships a small static French/Arabic legal
 * lexicon per domain so the crate is usable and testable out of the box.
 */

use crate::fallback::DomainHint;
use crate::language::Lang;

/// One (source term, target term) pair, oriented for a specific request
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPair {
    /// Term expected in the source text
    pub source: String,
    /// Recognized counterpart expected in the output
    pub target: String,
}

/// Read-only terminology collaborator consumed by the quality scorer.
pub trait TerminologyDictionary: Send + Sync + std::fmt::Debug {
    /// Return the (sourceTerm, targetTerm) pairs for a domain, oriented
    /// from `source` to `target` language.
    fn terms_for(&self, domain: DomainHint, source: Lang, target: Lang) -> Vec<TermPair>;
}

/// A (french, arabic) lexicon entry.
type Entry = (&'static str, &'static str);

const GENERIC_TERMS: &[Entry] = &[
    ("avocat", "محامي"),
    ("tribunal", "محكمة"),
    ("juge", "قاضي"),
    ("loi", "قانون"),
    ("jugement", "حكم"),
    ("article", "مادة"),
    ("appel", "استئناف"),
    ("procédure", "مسطرة"),
];

const FAMILY_TERMS: &[Entry] = &[
    ("mariage", "زواج"),
    ("divorce", "طلاق"),
    ("pension alimentaire", "نفقة"),
    ("garde", "حضانة"),
    ("époux", "زوج"),
];

const COMMERCIAL_TERMS: &[Entry] = &[
    ("société", "شركة"),
    ("contrat", "عقد"),
    ("commerce", "تجارة"),
    ("facture", "فاتورة"),
    ("créance", "دين"),
];

/// Static in-memory dictionary backed by the built-in lexicon.
#[derive(Debug, Clone, Default)]
pub struct StaticTerminology;

impl StaticTerminology {
    pub fn new() -> Self {
        Self
    }

    /// Domain entries plus the generic base set shared by every domain.
    fn entries(domain: DomainHint) -> Vec<Entry> {
        let mut entries: Vec<Entry> = GENERIC_TERMS.to_vec();
        match domain {
            DomainHint::Generic => {}
            DomainHint::FamilyLaw => entries.extend_from_slice(FAMILY_TERMS),
            DomainHint::Commercial => entries.extend_from_slice(COMMERCIAL_TERMS),
        }
        entries
    }
}

impl TerminologyDictionary for StaticTerminology {
    fn terms_for(&self, domain: DomainHint, source: Lang, target: Lang) -> Vec<TermPair> {
        if source == target {
            return Vec::new();
        }
        Self::entries(domain)
            .into_iter()
            .map(|(fr, ar)| match source {
                Lang::Fr => TermPair {
                    source: fr.to_string(),
                    target: ar.to_string(),
                },
                Lang::Ar => TermPair {
                    source: ar.to_string(),
                    target: fr.to_string(),
                },
            })
            .collect()
    }
}
