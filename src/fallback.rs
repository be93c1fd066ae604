/*!
 * Guaranteed-pure fallback content.
 *
 * When every engine is exhausted without an acceptable result, the gateway
 * returns a short, statically authored "content unavailable" notice in the
 * target language. Templates are pure lookups, never engine calls, and the
 * whole catalog is run through the purity validator at gateway construction:
 * a template failing that check is a fatal configuration fault, not a
 * runtime condition.
 */

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;
use crate::language::Lang;
use crate::purity::PurityValidator;

/// Caller-supplied category selecting the fallback template and the
/// terminology set. The domain is always named by the caller, never
/// guessed from the content.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DomainHint {
    /// Generic legal content (default)
    #[default]
    Generic,
    /// Family law (marriage, divorce, custody)
    FamilyLaw,
    /// Commercial law (contracts, companies)
    Commercial,
}

impl DomainHint {
    /// Lowercase identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::FamilyLaw => "family-law",
            Self::Commercial => "commercial",
        }
    }
}

impl std::fmt::Display for DomainHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DomainHint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "" => Ok(Self::Generic),
            "family-law" | "family" | "famille" => Ok(Self::FamilyLaw),
            "commercial" | "commerce" => Ok(Self::Commercial),
            other => Err(anyhow!("Unknown domain hint: {}", other)),
        }
    }
}

/// One static template entry.
struct Template {
    lang: Lang,
    domain: DomainHint,
    text: &'static str,
}

/// The static template table. Each text is authored monolingual in its
/// target language; digits and punctuation are neutral under the validator.
const TEMPLATES: &[Template] = &[
    Template {
        lang: Lang::Ar,
        domain: DomainHint::Generic,
        text: "المحتوى المترجم غير متوفر حاليا. يرجى إعادة المحاولة لاحقا أو مراجعة النص الأصلي.",
    },
    Template {
        lang: Lang::Ar,
        domain: DomainHint::FamilyLaw,
        text: "تعذر توفير الترجمة الخاصة بقضايا الأسرة حاليا. يرجى الرجوع إلى النص الأصلي أو استشارة مختص.",
    },
    Template {
        lang: Lang::Ar,
        domain: DomainHint::Commercial,
        text: "تعذر توفير الترجمة الخاصة بالمعاملات التجارية حاليا. يرجى الرجوع إلى النص الأصلي أو استشارة مختص.",
    },
    Template {
        lang: Lang::Fr,
        domain: DomainHint::Generic,
        text: "Le contenu traduit est momentanément indisponible. Veuillez réessayer plus tard ou consulter le texte original.",
    },
    Template {
        lang: Lang::Fr,
        domain: DomainHint::FamilyLaw,
        text: "La traduction relative au droit de la famille est momentanément indisponible. Veuillez consulter le texte original ou un spécialiste.",
    },
    Template {
        lang: Lang::Fr,
        domain: DomainHint::Commercial,
        text: "La traduction relative au droit commercial est momentanément indisponible. Veuillez consulter le texte original ou un spécialiste.",
    },
];

/// Catalog of pre-validated fallback templates. Construction runs every
/// template through the purity validator; any failure aborts with a
/// configuration fault.
#[derive(Debug, Clone)]
pub struct FallbackCatalog;

impl FallbackCatalog {
    /// Build the catalog, validating every template.
    pub fn new(validator: &PurityValidator) -> std::result::Result<Self, GatewayError> {
        for template in TEMPLATES {
            let verdict = validator.validate_text(template.text, template.lang);
            if !verdict.pass {
                return Err(GatewayError::ConfigurationFault(format!(
                    "fallback template ({}, {}) fails purity validation: target {:.1}%, foreign {:.1}%",
                    template.lang, template.domain, verdict.target_pct, verdict.foreign_pct
                )));
            }
        }
        Ok(Self)
    }

    /// Return the fallback text for a language and domain. Unknown domains
    /// fall back to the generic notice; a generic template exists for every
    /// supported language, so this never fails.
    pub fn generate(&self, lang: Lang, domain: DomainHint) -> &'static str {
        TEMPLATES
            .iter()
            .find(|t| t.lang == lang && t.domain == domain)
            .or_else(|| {
                TEMPLATES
                    .iter()
                    .find(|t| t.lang == lang && t.domain == DomainHint::Generic)
            })
            .map(|t| t.text)
            .unwrap_or("")
    }
}
