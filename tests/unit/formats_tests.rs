/*!
 * Tests for the subtitle codecs
 */

use std::path::Path;

use subtrans::errors::FormatError;
use subtrans::formats::{self, FormatKind};
use subtrans::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// ASS centisecond times become millisecond SubRip times
#[test]
fn test_convert_assToSrt_shouldKeepTimingAndStripTags() {
    let entries = formats::parse(common::SAMPLE_ASS, FormatKind::Ass).unwrap();
    let srt = formats::serialize(&entries, FormatKind::Srt);

    assert_eq!(
        srt,
        "1\n00:00:01,500 --> 00:00:03,000\nHello there\n\n2\n00:00:04,000 --> 00:00:06,250\nFirst line\nSecond line\n\n"
    );
}

#[test]
fn test_convert_assWithEmptyLine_toSrtAndVtt_shouldKeepEveryLine() {
    let ass = "[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
               Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Above\\N\\NBelow\n\
               Dialogue: 0,0:00:03.00,0:00:04.00,Default,,0,0,0,,After\n";
    let entries = formats::parse(ass, FormatKind::Ass).unwrap();

    for kind in [FormatKind::Srt, FormatKind::Vtt] {
        let reparsed = formats::parse(&formats::serialize(&entries, kind), kind).unwrap();
        let texts: Vec<&str> = reparsed.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Above\nBelow", "After"], "{:?}", kind);
    }
}

#[test]
fn test_parse_ass_shouldKeepStyleHints() {
    let entries = formats::parse(common::SAMPLE_ASS, FormatKind::Ass).unwrap();
    assert_eq!(entries[0].style_hints.as_deref(), Some("{\\b1}{\\b0}"));
    assert_eq!(entries[1].style_hints, None);
}

#[test]
fn test_serialize_srtToAss_shouldTruncateCentiseconds() {
    let entries = vec![SubtitleEntry::from_millis(1, 1_999, 2_005, "One\nTwo")];
    let ass = formats::serialize(&entries, FormatKind::Ass);

    assert!(ass.starts_with("[Script Info]"));
    assert!(ass.contains("[Events]"));
    assert!(ass.ends_with("Dialogue: 0,0:00:01.99,0:00:02.00,Default,,0,0,0,,One\\NTwo\n"));
}

#[test]
fn test_parse_vtt_shouldSkipNotesAndStripTags() {
    let entries = formats::parse(common::SAMPLE_VTT, FormatKind::Vtt).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Hello");
    assert_eq!(entries[0].end.as_millis(), 2_500);
    assert_eq!(entries[1].index, 2);
}

#[test]
fn test_serialize_vtt_shouldWriteHeaderAndDotTimestamps() {
    let entries = vec![SubtitleEntry::from_millis(1, 61_000, 62_500, "Hi")];
    assert_eq!(
        formats::serialize(&entries, FormatKind::Vtt),
        "WEBVTT\n\n1\n00:01:01.000 --> 00:01:02.500\nHi\n\n"
    );
}

#[test]
fn test_parse_srt_withWindowsLineEndingsAndBom_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n";
    let entries = formats::parse(content, FormatKind::Srt).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Hello");
}

#[test]
fn test_parse_withNoValidEntries_shouldFail() {
    for kind in FormatKind::ALL {
        assert_eq!(formats::parse("", kind), Err(FormatError::NoEntries), "{:?}", kind);
    }
}

#[test]
fn test_detectFormat_withUnknownExtensionAndAssContent_shouldSniffAss() {
    assert_eq!(
        formats::detect_format(Path::new("episode.sub"), Some(common::SAMPLE_ASS)),
        Some(FormatKind::Ass)
    );
}

#[test]
fn test_formatKind_fromExtension_shouldIgnoreCaseAndDot() {
    assert_eq!(FormatKind::from_extension(".VTT"), Some(FormatKind::Vtt));
    assert_eq!(FormatKind::from_extension("ass"), Some(FormatKind::Ass));
    assert_eq!(FormatKind::from_extension("sub"), None);
}

#[test]
fn test_subtitleCollection_load_shouldDetectFormatFromExtension() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "clip.vtt", common::SAMPLE_VTT)?;

    let collection = SubtitleCollection::load(&path)?;
    assert_eq!(collection.format, FormatKind::Vtt);
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.entries[0].text, "Hello");
    Ok(())
}
