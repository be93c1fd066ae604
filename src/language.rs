/*!
 * Language handling for the two supported scripts.
 *
 * The gateway translates between exactly two languages: Arabic ("ar") and
 * French ("fr"). ISO 639 codes are validated and normalized through isolang
 * so callers may submit 2-letter or 3-letter codes interchangeably.
 */

use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};

use crate::script::Script;

/// A supported target language.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// Arabic
    Ar,
    /// French
    Fr,
}

impl Lang {
    /// The Unicode script family expected for text in this language.
    pub fn script(&self) -> Script {
        match self {
            Self::Ar => Script::Arabic,
            Self::Fr => Script::Latin,
        }
    }

    /// ISO 639-1 code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Fr => "fr",
        }
    }

    /// English display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ar => "Arabic",
            Self::Fr => "French",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Lang {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_lang(s)
    }
}

/// Parse an ISO 639-1 or 639-2 language code into a supported language.
///
/// Accepts "ar"/"ara" and "fr"/"fra"/"fre"; any other valid ISO code is
/// rejected as unsupported, anything else as invalid.
pub fn parse_lang(code: &str) -> Result<Lang> {
    let normalized = code.trim().to_lowercase();

    // 639-2/B "fre" is not in isolang's 639-3 table
    if normalized == "fre" {
        return Ok(Lang::Fr);
    }

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    match language.to_639_3() {
        "ara" => Ok(Lang::Ar),
        "fra" => Ok(Lang::Fr),
        other => Err(anyhow!(
            "Unsupported language: {} (only Arabic and French are supported)",
            other
        )),
    }
}
