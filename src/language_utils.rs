use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Codes are accepted as ISO 639-1 (`fr`), ISO 639-2/T (`fra`) or ISO 639-2/B
/// (`fre`). The pseudo-code `auto` asks for detection and is accepted wherever
/// a source language is expected.

/// Pseudo language code requesting detection
pub const AUTO: &str = "auto";

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// The `auto` pseudo-code
    Auto,
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO)
}

fn lookup(code: &str) -> Option<(Language, LanguageCodeType)> {
    let code = code.trim().to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code).map(|l| (l, LanguageCodeType::Part1)),
        3 => Language::from_639_3(&code)
            .map(|l| (l, LanguageCodeType::Part2T))
            .or_else(|| {
                BIBLIOGRAPHIC_CODES
                    .iter()
                    .find(|(b, _)| *b == code)
                    .and_then(|(_, t)| Language::from_639_3(t))
                    .map(|l| (l, LanguageCodeType::Part2B))
            }),
        _ => None,
    }
}

/// Validate a language code, accepting `auto`
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    if is_auto(code) {
        return Ok(LanguageCodeType::Auto);
    }
    lookup(code)
        .map(|(_, kind)| kind)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|(lang, _)| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize to ISO 639-1 when one exists, otherwise ISO 639-2/T
///
/// `auto` is passed through as is.
pub fn normalize(code: &str) -> Result<String> {
    if is_auto(code) {
        return Ok(AUTO.to_string());
    }
    lookup(code)
        .map(|(lang, _)| {
            lang.to_639_1()
                .map(str::to_string)
                .unwrap_or_else(|| lang.to_639_3().to_string())
        })
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some((a, _)), Some((b, _))) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    if is_auto(code) {
        return Ok("Auto-detect".to_string());
    }
    lookup(code)
        .map(|(lang, _)| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}
