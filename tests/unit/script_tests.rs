/*!
 * Tests for script analysis and profile arithmetic
 */

use tarjama::language::Lang;
use tarjama::script::{Script, analyze};

#[test]
fn test_analyze_withFrenchLegalFragment_shouldBeFullyLatin() {
    let profile = analyze("Vu l'article 455 du code de procédure civile ;");
    assert_eq!(profile.arabic, 0);
    assert_eq!(profile.unclassified, 0);
    assert_eq!(profile.target_share(Lang::Fr), 100.0);
}

#[test]
fn test_analyze_withArabicLegalFragment_shouldBeFullyArabic() {
    let profile = analyze("وبعد المداولة طبقا للقانون، قضت المحكمة برفض الطلب.");
    assert_eq!(profile.latin, 0);
    assert_eq!(profile.target_share(Lang::Ar), 100.0);
}

#[test]
fn test_analyze_withArabicIndicDigits_shouldTreatDigitsAsNeutral() {
    let with_digits = analyze("الفصل ٢٣٠ من قانون الالتزامات والعقود");
    let without = analyze("الفصل من قانون الالتزامات والعقود");
    assert_eq!(with_digits.target_share(Lang::Ar), 100.0);
    assert_eq!(without.target_share(Lang::Ar), 100.0);
}

#[test]
fn test_analyze_withPresentationForms_shouldCountAsArabic() {
    // Arabic presentation forms block (U+FB50..U+FDFF)
    let profile = analyze("\u{FB50}\u{FB51}");
    assert_eq!(profile.arabic, 2);
}

#[test]
fn test_analyze_withGuillemets_shouldIgnoreThem() {
    let profile = analyze("«contrat»");
    assert_eq!(profile.latin, 7);
    assert_eq!(profile.unclassified, 0);
}

#[test]
fn test_foreignShare_withMixedText_shouldMatchLatinFraction() {
    let profile = analyze("عقد ab\u{0639}"); // 3 arabic + 1 arabic + 2 latin
    let foreign = profile.foreign_share(Lang::Ar);
    assert!((foreign - 2.0 * 100.0 / 6.0).abs() < 1e-9, "foreign {}", foreign);
}

#[test]
fn test_dominantForeign_shouldPointAtOtherFamily() {
    let profile = analyze("Tribunal محكمة");
    assert_eq!(profile.dominant_foreign(Lang::Fr), Some(Script::Arabic));
    assert_eq!(profile.dominant_foreign(Lang::Ar), Some(Script::Latin));
}
