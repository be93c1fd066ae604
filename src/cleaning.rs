/*!
 * Multi-pass content cleaning for engine responses.
 *
 * Generative engines routinely leak metadata into their output: preamble
 * chatter ("Here is the translation:"), echoed UI labels, and tokens of two
 * scripts glued together with no separator. The cleaner is a declaratively
 * ordered table of rules that removes these artifacts and repairs
 * script-adjacency glue.
 *
 * The cleaner runs twice per request (pre-dispatch on the source, and
 * post-response on the raw engine output), so cleaning must be idempotent:
 * re-applying it to its own output is a no-op. Each rule is driven to a
 * fixpoint, and the whole table repeats until it stabilizes, which keeps
 * stacked artifacts ("Sure! Here is the translation: Translation: ...")
 * from surviving.
 *
 * Legal-citation tokens (article and law numbers, embedded digits and
 * punctuation) are never touched: no rule matches digits or punctuation
 * except the final whitespace normalization, which only collapses runs.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Which stage of the pipeline a rule belongs to. Rules are applied in
/// group order, then in declaration order within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    /// AI preamble and instruction-echo removal
    Preamble,
    /// Concatenated UI-label artifact removal
    UiLabel,
    /// Script-adjacency repair (separator insertion)
    Adjacency,
    /// Whitespace normalization
    Whitespace,
}

/// One ordered cleaning step. Rules are data: independently testable and
/// extensible without touching orchestration code.
pub struct CleaningRule {
    /// Stable identifier, reported in diagnostics when the rule fires
    pub id: &'static str,
    /// Pipeline stage
    pub group: RuleGroup,
    /// Match pattern
    pattern: Regex,
    /// Replacement text (may reference capture groups)
    replacement: &'static str,
}

impl CleaningRule {
    fn new(id: &'static str, group: RuleGroup, pattern: &str, replacement: &'static str) -> Self {
        Self {
            id,
            group,
            // Patterns are compile-time constants; a malformed one is a
            // programming error, caught by the rule-table tests.
            pattern: Regex::new(pattern).expect("invalid cleaning rule pattern"),
            replacement,
        }
    }

    /// Apply this rule to a fixpoint. Returns the result and whether the
    /// rule changed anything.
    fn apply(&self, text: &str) -> (String, bool) {
        let mut current = text.to_string();
        let mut fired = false;
        // Anchored rules replace one occurrence per pass; stacked artifacts
        // need a few iterations. The cap guards against a pathological
        // non-converging pattern.
        for _ in 0..16 {
            let next = self.pattern.replace_all(&current, self.replacement);
            if next == current {
                break;
            }
            fired = true;
            current = next.into_owned();
        }
        (current, fired)
    }
}

impl std::fmt::Debug for CleaningRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleaningRule")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Latin letter class used by the adjacency rules: ASCII letters plus the
/// accented ranges French actually uses.
const LATIN_LETTER: &str = r"A-Za-zÀ-ÖØ-öø-ɏ";

/// The default rule table, in application order.
static RULES: Lazy<Vec<CleaningRule>> = Lazy::new(|| {
    vec![
        // --- Preamble / instruction-echo removal ---
        CleaningRule::new(
            "strip-code-fence",
            RuleGroup::Preamble,
            r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$",
            "$1",
        ),
        CleaningRule::new(
            "preamble-en",
            RuleGroup::Preamble,
            r"(?i)^\s*(?:sure[,.!]?\s*|certainly[,.!]?\s*)?(?:here\s+(?:is|'s)\s+(?:the\s+)?(?:requested\s+)?translation|the\s+translation\s+is|translated\s+text)\s*[:：]?\s*",
            "",
        ),
        CleaningRule::new(
            "preamble-fr",
            RuleGroup::Preamble,
            r"(?i)^\s*(?:bien\s+sûr[,.!]?\s*)?voici\s+la\s+traduction(?:\s+demandée)?\s*[:：]?\s*",
            "",
        ),
        CleaningRule::new(
            "preamble-ar",
            RuleGroup::Preamble,
            r"^\s*(?:إليك|هذه|فيما يلي)\s+الترجمة(?:\s+المطلوبة)?\s*[:：]?\s*",
            "",
        ),
        CleaningRule::new(
            "label-translation",
            RuleGroup::Preamble,
            r"(?i)^\s*(?:translation|traduction|الترجمة)\s*[:：]\s*",
            "",
        ),
        CleaningRule::new(
            "trailer-note",
            RuleGroup::Preamble,
            r"(?is)\n\s*(?:note|remarque|ملاحظة)\s*[:：].*$",
            "",
        ),
        // --- UI-label artifact removal ---
        CleaningRule::new(
            "ui-label-leading",
            RuleGroup::UiLabel,
            r"(?i)^\s*(?:output|result|résultat|النتيجة)\s*[:：]\s*",
            "",
        ),
        CleaningRule::new(
            "ui-label-trailing",
            RuleGroup::UiLabel,
            r"(?i)\s*\b(?:copy|copier|copied|copié|regenerate|régénérer)\s*$",
            "",
        ),
        CleaningRule::new(
            "ui-label-trailing-ar",
            RuleGroup::UiLabel,
            r"\s*(?:نسخ|انسخ|إعادة الإنشاء)\s*$",
            "",
        ),
        // --- Script-adjacency repair ---
        // A target-script token directly abutting a token of the other
        // script gets a single separating space. Digits and punctuation are
        // deliberately outside both classes, so citations survive.
        CleaningRule::new(
            "adjacency-arabic-latin",
            RuleGroup::Adjacency,
            &format!(r"(\p{{Arabic}})([{}])", LATIN_LETTER),
            "$1 $2",
        ),
        CleaningRule::new(
            "adjacency-latin-arabic",
            RuleGroup::Adjacency,
            &format!(r"([{}])(\p{{Arabic}})", LATIN_LETTER),
            "$1 $2",
        ),
        // --- Whitespace normalization ---
        CleaningRule::new("collapse-whitespace", RuleGroup::Whitespace, r"\s+", " "),
        CleaningRule::new("trim-edges", RuleGroup::Whitespace, r"^\s+|\s+$", ""),
    ]
});

/// Result of a cleaning pass: the cleaned text plus the ordered ids of the
/// rules that fired, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Cleaned text
    pub text: String,
    /// Ids of rules that changed the text, in application order
    pub fired: Vec<&'static str>,
}

/// The content cleaner: an ordered, idempotent rule pipeline.
#[derive(Debug, Clone, Default)]
pub struct ContentCleaner;

impl ContentCleaner {
    /// Create a cleaner over the default rule table.
    pub fn new() -> Self {
        Self
    }

    /// The rule table, in application order.
    pub fn rules(&self) -> &'static [CleaningRule] {
        &RULES
    }

    /// Apply the full rule table, in order, until no rule fires.
    ///
    /// A single pass is not always enough: stripping a leading UI label
    /// can expose a preamble that only an earlier rule matches. Repeating
    /// the table until it stabilizes is what makes `clean` idempotent.
    pub fn clean(&self, text: &str) -> CleanOutcome {
        let mut current = text.to_string();
        let mut fired = Vec::new();
        for _ in 0..4 {
            let mut changed_any = false;
            for rule in RULES.iter() {
                let (next, changed) = rule.apply(&current);
                if changed {
                    changed_any = true;
                    if !fired.contains(&rule.id) {
                        fired.push(rule.id);
                    }
                }
                current = next;
            }
            if !changed_any {
                break;
            }
        }
        CleanOutcome { text: current, fired }
    }

    /// Check the idempotence contract over a set of sample inputs:
    /// `clean(clean(x)) == clean(x)` must hold for each sample.
    pub fn verify_idempotence<'a, I>(&self, samples: I) -> Result<(), String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for sample in samples {
            let once = self.clean(sample);
            let twice = self.clean(&once.text);
            if twice.text != once.text {
                return Err(format!(
                    "rule table is not idempotent on {:?}: {:?} -> {:?}",
                    sample, once.text, twice.text
                ));
            }
        }
        Ok(())
    }
}
