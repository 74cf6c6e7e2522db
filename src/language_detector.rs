/*!
 * Heuristic language detection for subtitle text.
 *
 * Each known language has a handful of very common words and an alphabet.
 * A text scores `0.3 * char_score + 0.7 * word_score` per language, where
 * `char_score` is the share of its letters found in the alphabet and
 * `word_score` the share of its words found in the word list. The best score
 * wins when it exceeds [`MIN_CONFIDENCE`].
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::subtitle_processor::SubtitleEntry;

/// Lowest combined score accepted as a detection
pub const MIN_CONFIDENCE: f64 = 0.05;

/// Entries sampled by [`LanguageDetector::detect_entries`]
pub const SAMPLE_ENTRIES: usize = 20;

const CHAR_WEIGHT: f64 = 0.3;
const WORD_WEIGHT: f64 = 0.7;

static MARKUP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>|\{[^}]*\}|&[^;\s]+;").expect("valid markup regex"));
/// Anything that is not a letter, a combining mark or whitespace
static NOISE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\s]").expect("valid noise regex"));
static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Word list and alphabet for one language
#[derive(Debug)]
pub struct LanguageProfile {
    pub code: &'static str,
    pub name: &'static str,
    pub words: &'static [&'static str],
    pub alphabet: &'static str,
}

const LATIN: &str = "abcdefghijklmnopqrstuvwxyz";

/// Known languages in tie-break order
pub static PROFILES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "en",
        name: "English",
        words: &["the", "and", "you", "that", "was", "for", "are", "with", "his", "they"],
        alphabet: LATIN,
    },
    LanguageProfile {
        code: "ar",
        name: "Arabic",
        words: &["في", "من", "إلى", "على", "هذا", "هذه", "التي", "الذي", "كان", "كانت"],
        alphabet: "ابتثجحخدذرزسشصضطظعغفقكلمنهوي",
    },
    LanguageProfile {
        code: "fr",
        name: "French",
        words: &["le", "de", "et", "à", "un", "il", "être", "en", "avoir"],
        alphabet: "abcdefghijklmnopqrstuvwxyzàâäéèêëïîôöùûüÿç",
    },
    LanguageProfile {
        code: "es",
        name: "Spanish",
        words: &["el", "la", "de", "que", "y", "a", "en", "un", "ser", "se"],
        alphabet: "abcdefghijklmnopqrstuvwxyzáéíóúüñ",
    },
    LanguageProfile {
        code: "de",
        name: "German",
        words: &["der", "die", "und", "in", "den", "von", "zu", "das", "mit", "sich"],
        alphabet: "abcdefghijklmnopqrstuvwxyzäöüß",
    },
    LanguageProfile {
        code: "it",
        name: "Italian",
        words: &["il", "di", "che", "e", "la", "per", "una", "in", "del", "è"],
        alphabet: "abcdefghijklmnopqrstuvwxyzàèéìíîòóù",
    },
    LanguageProfile {
        code: "ru",
        name: "Russian",
        words: &["в", "и", "не", "на", "я", "быть", "тот", "он", "оно", "они"],
        alphabet: "абвгдеёжзийклмнопрстуфхцчшщъыьэюя",
    },
    LanguageProfile {
        code: "ja",
        name: "Japanese",
        words: &["の", "に", "は", "を", "た", "が", "で", "て", "と", "し"],
        alphabet: "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをん",
    },
    LanguageProfile {
        code: "ko",
        name: "Korean",
        words: &["이", "은", "는", "을", "를", "에", "의", "가", "와", "과"],
        alphabet: "가나다라마바사아자차카타파하",
    },
    LanguageProfile {
        code: "zh",
        name: "Chinese",
        words: &["的", "一", "是", "在", "不", "了", "有", "和", "人", "这"],
        alphabet: "一二三四五六七八九十",
    },
];

/// Result of a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    /// `None` when no language scored high enough
    pub language: Option<&'static str>,
    /// Combined score of the winner, 0 when unknown
    pub confidence: f64,
}

impl Detection {
    pub const UNKNOWN: Detection = Detection {
        language: None,
        confidence: 0.0,
    };

    pub fn is_known(&self) -> bool {
        self.language.is_some()
    }

    /// Detected code or `fallback`
    pub fn language_or<'a>(&self, fallback: &'a str) -> &'a str {
        self.language.unwrap_or(fallback)
    }
}

/// Heuristic detector over [`PROFILES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Remove subtitle markup, digits and punctuation, and collapse whitespace
    pub fn clean_text(text: &str) -> String {
        let without_markup = MARKUP_REGEX.replace_all(text, "");
        let without_noise = NOISE_REGEX.replace_all(&without_markup, " ");
        SPACE_REGEX.replace_all(&without_noise, " ").trim().to_string()
    }

    pub fn detect(&self, text: &str) -> Detection {
        let cleaned = Self::clean_text(text).to_lowercase();
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        if words.is_empty() {
            return Detection::UNKNOWN;
        }

        let letters: Vec<char> = cleaned.chars().filter(|c| c.is_alphabetic()).collect();

        let mut best = Detection::UNKNOWN;
        for profile in PROFILES {
            let char_score = if letters.is_empty() {
                0.0
            } else {
                let known = letters.iter().filter(|c| profile.alphabet.contains(**c)).count();
                known as f64 / letters.len() as f64
            };
            let matches = words.iter().filter(|w| profile.words.contains(w)).count();
            let word_score = matches as f64 / words.len() as f64;

            let combined = CHAR_WEIGHT * char_score + WORD_WEIGHT * word_score;
            if combined > best.confidence {
                best = Detection {
                    language: Some(profile.code),
                    confidence: combined,
                };
            }
        }

        if best.confidence > MIN_CONFIDENCE {
            best
        } else {
            Detection::UNKNOWN
        }
    }

    /// Detect from the joined text of the first [`SAMPLE_ENTRIES`] entries
    pub fn detect_entries(&self, entries: &[SubtitleEntry]) -> Detection {
        let sample = entries
            .iter()
            .take(SAMPLE_ENTRIES)
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.detect(&sample)
    }

    /// Languages this detector can recognize, as `(code, name)`
    pub fn supported_languages(&self) -> Vec<(&'static str, &'static str)> {
        PROFILES.iter().map(|p| (p.code, p.name)).collect()
    }
}

/// Display name of a language code
///
/// Looks at the detector's own table first, then ISO 639 names; unknown codes
/// come back upper-cased.
pub fn language_name(code: &str) -> String {
    let code = code.trim();
    if let Some(profile) = PROFILES.iter().find(|p| p.code.eq_ignore_ascii_case(code)) {
        return profile.name.to_string();
    }
    crate::language_utils::get_language_name(code).unwrap_or_else(|_| code.to_uppercase())
}
