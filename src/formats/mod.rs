/*!
 * Subtitle format codecs.
 *
 * Parsing and serialization for SubRip (`.srt`), Advanced SubStation Alpha
 * (`.ass`) and WebVTT (`.vtt`). Every codec produces and consumes the same
 * ordered list of [`SubtitleEntry`] values:
 *
 * - `timestamp`: the shared timestamp type and its three encodings
 * - `srt`, `ass`, `vtt`: one codec per format
 *
 * Tag stripping on input is one-way. Serialization always renumbers from 1.
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FormatError;
use crate::subtitle_processor::SubtitleEntry;

pub mod ass;
pub mod srt;
pub mod timestamp;
pub mod vtt;

pub use ass::AssCodec;
pub use srt::SrtCodec;
pub use timestamp::Timestamp;
pub use vtt::VttCodec;

/// Number of leading characters inspected when the extension is not conclusive
const SNIFF_LEN: usize = 200;

static SRT_SNIFF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+\s*\n\s*\d{1,2}:\d{2}:\d{2}").expect("valid regex"));

static SECTION_HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*\[(script info|v4\+? styles|events|fonts|graphics)\]\s*$").expect("valid regex"));

/// A supported subtitle format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Srt,
    Ass,
    Vtt,
}

impl FormatKind {
    pub const ALL: [FormatKind; 3] = [FormatKind::Srt, FormatKind::Ass, FormatKind::Vtt];

    /// Map a file extension (with or without the dot, any case)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "ass" => Some(Self::Ass),
            "vtt" => Some(Self::Vtt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Vtt => "vtt",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Srt => "SubRip",
            Self::Ass => "Advanced SubStation Alpha",
            Self::Vtt => "WebVTT",
        }
    }

    /// The codec that reads and writes this format
    pub fn codec(&self) -> &'static dyn SubtitleCodec {
        match self {
            Self::Srt => &SrtCodec,
            Self::Ass => &AssCodec,
            Self::Vtt => &VttCodec,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FormatKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| FormatError::Unsupported(s.to_string()))
    }
}

/// Reads and writes one subtitle format
pub trait SubtitleCodec: Send + Sync {
    fn kind(&self) -> FormatKind;

    /// Parse file content into entries numbered 1..n in file order.
    ///
    /// Malformed blocks are skipped with a warning. Zero surviving entries is
    /// [`FormatError::NoEntries`].
    fn parse(&self, content: &str) -> Result<Vec<SubtitleEntry>, FormatError>;

    /// Render entries, renumbering from 1.
    fn serialize(&self, entries: &[SubtitleEntry]) -> String;
}

/// Decide the format of a file.
///
/// A recognised extension wins. Otherwise the first characters of `content`
/// are inspected: `WEBVTT` means WebVTT, an ASS section header or a
/// `Format:` line means ASS, an index line followed by a timestamp means SubRip.
pub fn detect_format(path: &Path, content: Option<&str>) -> Option<FormatKind> {
    if let Some(kind) = path
        .extension()
        .and_then(|ext| FormatKind::from_extension(&ext.to_string_lossy()))
    {
        return Some(kind);
    }

    let content = content?;
    detect_from_content(content)
}

/// Content sniffing used when the extension is unknown
pub fn detect_from_content(content: &str) -> Option<FormatKind> {
    let head: String = normalize_content(content).chars().take(SNIFF_LEN).collect();

    if head.trim_start().starts_with("WEBVTT") {
        Some(FormatKind::Vtt)
    } else if SECTION_HEADER_REGEX.is_match(&head) || head.lines().any(|l| l.trim_start().starts_with("Format:")) {
        Some(FormatKind::Ass)
    } else if SRT_SNIFF_REGEX.is_match(&head) {
        Some(FormatKind::Srt)
    } else {
        None
    }
}

/// Parse `content` as `kind`
pub fn parse(content: &str, kind: FormatKind) -> Result<Vec<SubtitleEntry>, FormatError> {
    kind.codec().parse(content)
}

/// Serialize `entries` as `kind`
pub fn serialize(entries: &[SubtitleEntry], kind: FormatKind) -> String {
    kind.codec().serialize(entries)
}

/// Remove ASS override blocks (`{\i1}` and friends)
pub fn strip_ass_tags(text: &str) -> String {
    ass::OVERRIDE_REGEX.replace_all(text, "").into_owned()
}

/// Remove WebVTT/HTML-style inline tags (`<i>`, `<c.yellow>`, `<00:01.000>`)
pub fn strip_vtt_tags(text: &str) -> String {
    vtt::TAG_REGEX.replace_all(text, "").into_owned()
}

/// Drop a leading BOM and normalize line endings to `\n`
pub(crate) fn normalize_content(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Split normalized content into blocks separated by blank lines
pub(crate) fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Split a `start --> end [settings]` line into its two halves
pub(crate) fn split_timing_line(line: &str) -> Option<(&str, &str)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((start.trim(), end))
}

/// Cue text ready for a blank-line delimited format.
///
/// A blank line would end the cue, so empty lines inside the text are dropped.
pub(crate) fn cue_lines(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renumber parsed entries 1..n, failing when nothing survived
pub(crate) fn finish_entries(mut entries: Vec<SubtitleEntry>) -> Result<Vec<SubtitleEntry>, FormatError> {
    if entries.is_empty() {
        return Err(FormatError::NoEntries);
    }
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.index = position + 1;
    }
    Ok(entries)
}
