/*!
 * Script analysis for bilingual text.
 *
 * Classifies the characters of a text sample by Unicode script family and
 * computes a distribution profile. The profile is the sole input to purity
 * validation: everything downstream reasons about script shares, never about
 * raw text.
 *
 * Whitespace, punctuation, and digits are neutral and excluded from the
 * counts. Digits in particular must stay neutral so legal citations with
 * embedded Latin digits ("المادة 145") never count against Arabic purity.
 */

use serde::{Deserialize, Serialize};

use crate::language::Lang;

/// A Unicode script family recognized by the analyzer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Arabic script (base block, supplements, presentation forms)
    Arabic,
    /// Latin script (ASCII letters plus Latin-1 and extended letters)
    Latin,
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arabic => write!(f, "arabic"),
            Self::Latin => write!(f, "latin"),
        }
    }
}

/// Classification of a single code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Arabic,
    Latin,
    Unclassified,
    Neutral,
}

/// Character-class distribution of a text sample.
///
/// Computed per analysis call and discarded after use; carries raw counts so
/// shares can be derived against any denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptProfile {
    /// Count of Arabic-script characters
    pub arabic: usize,
    /// Count of Latin-script characters
    pub latin: usize,
    /// Count of meaningful characters belonging to neither family
    pub unclassified: usize,
}

impl ScriptProfile {
    /// Characters classified into a known script family.
    pub fn classified(&self) -> usize {
        self.arabic + self.latin
    }

    /// All meaningful (non-neutral) characters.
    pub fn meaningful(&self) -> usize {
        self.arabic + self.latin + self.unclassified
    }

    /// Count for one script family.
    pub fn count_of(&self, script: Script) -> usize {
        match script {
            Script::Arabic => self.arabic,
            Script::Latin => self.latin,
        }
    }

    /// Percentage share of one script family among meaningful characters.
    /// Returns 0.0 when the profile is empty.
    pub fn share_of(&self, script: Script) -> f64 {
        let meaningful = self.meaningful();
        if meaningful == 0 {
            return 0.0;
        }
        self.count_of(script) as f64 * 100.0 / meaningful as f64
    }

    /// Share of the script expected for the declared language.
    pub fn target_share(&self, lang: Lang) -> f64 {
        self.share_of(lang.script())
    }

    /// Combined share of every meaningful character outside the target
    /// script. Unclassified characters count as foreign: a third script
    /// leaking into the output is exactly what purity must catch.
    pub fn foreign_share(&self, lang: Lang) -> f64 {
        let meaningful = self.meaningful();
        if meaningful == 0 {
            return 0.0;
        }
        let foreign = meaningful - self.count_of(lang.script());
        foreign as f64 * 100.0 / meaningful as f64
    }

    /// The dominant non-target script family, if any of its characters are
    /// present. Used for failure diagnostics.
    pub fn dominant_foreign(&self, lang: Lang) -> Option<Script> {
        let other = match lang.script() {
            Script::Arabic => Script::Latin,
            Script::Latin => Script::Arabic,
        };
        if self.count_of(other) > 0 {
            Some(other)
        } else {
            None
        }
    }
}

/// Classify a single code point.
///
/// Neutral characters (whitespace, punctuation, digits) are checked first:
/// Arabic-Indic digits live inside the Arabic block and must not be counted
/// as script characters.
fn classify(c: char) -> CharClass {
    if is_neutral(c) {
        return CharClass::Neutral;
    }

    match c as u32 {
        // Arabic, Arabic Supplement, Arabic Extended-A, presentation forms
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF => {
            CharClass::Arabic
        }
        _ if c.is_ascii_alphabetic() => CharClass::Latin,
        // Latin-1 letters (excluding multiplication/division signs) and
        // Latin Extended-A/B
        0x00C0..=0x00FF if c as u32 != 0x00D7 && c as u32 != 0x00F7 => CharClass::Latin,
        0x0100..=0x024F => CharClass::Latin,
        _ => CharClass::Unclassified,
    }
}

/// Whether a character is neutral for purity purposes.
fn is_neutral(c: char) -> bool {
    if c.is_whitespace() || c.is_ascii_punctuation() {
        return true;
    }
    match c as u32 {
        // ASCII and Arabic-Indic digits
        0x0030..=0x0039 | 0x0660..=0x0669 | 0x06F0..=0x06F9 => true,
        // Arabic punctuation: comma, date separator, semicolon, triple dot,
        // question mark, percent sign
        0x060C | 0x060D | 0x061B | 0x061E | 0x061F | 0x066A => true,
        // Arabic thousands/decimal separators and ornate parens
        0x066B | 0x066C | 0xFD3E | 0xFD3F => true,
        // Tatweel is layout, not content
        0x0640 => true,
        // Latin-1 and general punctuation, guillemets included
        0x00A0..=0x00BF => true,
        0x2000..=0x206F => true,
        _ => false,
    }
}

/// Analyze a text sample and return its script profile.
///
/// Pure and O(n); empty or punctuation-only input yields the all-zero
/// profile.
pub fn analyze(text: &str) -> ScriptProfile {
    let mut profile = ScriptProfile::default();
    for c in text.chars() {
        match classify(c) {
            CharClass::Arabic => profile.arabic += 1,
            CharClass::Latin => profile.latin += 1,
            CharClass::Unclassified => profile.unclassified += 1,
            CharClass::Neutral => {}
        }
    }
    profile
}
