/*!
 * Tests for language detection and language code utilities
 */

use subtrans::language_detector::{Detection, LanguageDetector, language_name};
use subtrans::language_utils::{self, LanguageCodeType};
use subtrans::subtitle_processor::SubtitleEntry;

#[test]
fn test_detect_withFrenchDialogue_shouldReturnFrench() {
    let detection = LanguageDetector::new().detect("Il est le chef de la maison et un ami");
    assert_eq!(detection.language, Some("fr"));
    assert!(detection.confidence > 0.05);
}

#[test]
fn test_detect_withPunctuatedDialogue_shouldMatchWordLists() {
    let detector = LanguageDetector::new();
    let plain = detector.detect("Il est le chef de la maison et un ami");
    let punctuated = detector.detect("Il est le chef, de la maison... et un ami!");
    assert_eq!(punctuated.language, Some("fr"));
    assert!((plain.confidence - punctuated.confidence).abs() < 1e-9);
}

#[test]
fn test_detect_withRussian_shouldReturnRussian() {
    let detection = LanguageDetector::new().detect("Я не знаю, что это такое");
    assert_eq!(detection.language, Some("ru"));
}

#[test]
fn test_detect_withMarkupAndNumbers_shouldIgnoreThem() {
    let detector = LanguageDetector::new();
    let plain = detector.detect("the house is on the hill");
    let marked = detector.detect("<i>the house</i> {\\b1}is{\\b0} on 42 the hill");
    assert_eq!(plain.language, marked.language);
    assert_eq!(marked.language, Some("en"));
}

#[test]
fn test_detectEntries_shouldSampleEntryText() {
    let entries = vec![
        SubtitleEntry::from_millis(1, 0, 1_000, "Where is the station?"),
        SubtitleEntry::from_millis(2, 1_000, 2_000, "It is over there, and you can walk."),
    ];
    assert_eq!(LanguageDetector::new().detect_entries(&entries).language, Some("en"));
}

#[test]
fn test_detectEntries_withNoEntries_shouldBeUnknown() {
    let detection = LanguageDetector::new().detect_entries(&[]);
    assert_eq!(detection, Detection::UNKNOWN);
    assert_eq!(detection.language_or("en"), "en");
}

#[test]
fn test_cleanText_shouldStripTagsDigitsAndCollapseSpaces() {
    assert_eq!(LanguageDetector::clean_text("<b>Hi</b>   there 123"), "Hi there");
}

#[test]
fn test_supportedLanguages_shouldStartWithEnglish() {
    let languages = LanguageDetector::new().supported_languages();
    assert_eq!(languages.len(), 10);
    assert_eq!(languages[0], ("en", "English"));
}

#[test]
fn test_languageName_shouldFallBackToIsoNamesThenCode() {
    assert_eq!(language_name("fr"), "French");
    assert_eq!(language_name("nl"), "Dutch");
    assert_eq!(language_name("xx"), "XX");
}

#[test]
fn test_validateLanguageCode_withAuto_shouldBeAuto() {
    assert_eq!(language_utils::validate_language_code("auto").unwrap(), LanguageCodeType::Auto);
    assert!(language_utils::validate_language_code("zzz").is_err());
}

#[test]
fn test_normalize_withThreeLetterCodes_shouldReturnTwoLetterCodes() {
    assert_eq!(language_utils::normalize("fra").unwrap(), "fr");
    assert_eq!(language_utils::normalize("fre").unwrap(), "fr");
    assert_eq!(language_utils::normalize("auto").unwrap(), "auto");
}
