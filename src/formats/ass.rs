/*!
 * Advanced SubStation Alpha codec.
 *
 * Only the `[Events]` section is read. Its `Format:` line decides the column
 * order, and each `Dialogue:` line is split into exactly that many fields so
 * commas inside the text column survive.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FormatKind, SubtitleCodec, Timestamp, finish_entries, normalize_content};
use crate::errors::FormatError;
use crate::subtitle_processor::SubtitleEntry;

pub(crate) static OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").expect("valid regex"));

const DEFAULT_EVENT_FORMAT: [&str; 10] = [
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

const OUTPUT_HEADER: &str = "[Script Info]
Title: Translated Subtitles
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Reads and writes `.ass` files
#[derive(Debug, Clone, Copy, Default)]
pub struct AssCodec;

/// Column layout taken from an `[Events]` `Format:` line
struct EventFormat {
    columns: Vec<String>,
    start: usize,
    end: usize,
    text: usize,
}

impl EventFormat {
    fn from_columns(columns: Vec<String>) -> Option<Self> {
        let position = |name: &str| columns.iter().position(|c| c == name);
        Some(Self {
            start: position("start")?,
            end: position("end")?,
            text: position("text")?,
            columns,
        })
    }

    fn standard() -> Self {
        Self {
            columns: DEFAULT_EVENT_FORMAT.iter().map(|c| c.to_string()).collect(),
            start: 1,
            end: 2,
            text: 9,
        }
    }

    fn parse(line: &str) -> Option<Self> {
        let columns = line
            .split(',')
            .map(|c| c.trim().to_ascii_lowercase())
            .collect();
        Self::from_columns(columns)
    }

    fn parse_dialogue(&self, body: &str) -> Option<SubtitleEntry> {
        let fields: Vec<&str> = body.splitn(self.columns.len(), ',').collect();
        if fields.len() < self.columns.len() {
            return None;
        }

        let start = Timestamp::parse_ass(fields[self.start])?;
        let end = Timestamp::parse_ass(fields[self.end])?;
        let (text, style_hints) = clean_dialogue_text(fields[self.text]);

        let mut entry = SubtitleEntry::new(0, start, end, text);
        entry.style_hints = style_hints;
        Some(entry)
    }
}

/// Strip override blocks, returning the plain text and the removed blocks
fn clean_dialogue_text(raw: &str) -> (String, Option<String>) {
    let hints: String = OVERRIDE_REGEX.find_iter(raw).map(|m| m.as_str()).collect();
    let text = OVERRIDE_REGEX
        .replace_all(raw, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ");

    let hints = if hints.is_empty() { None } else { Some(hints) };
    (text.trim().to_string(), hints)
}

impl SubtitleCodec for AssCodec {
    fn kind(&self) -> FormatKind {
        FormatKind::Ass
    }

    fn parse(&self, content: &str) -> Result<Vec<SubtitleEntry>, FormatError> {
        let content = normalize_content(content);
        let mut entries = Vec::new();
        let mut in_events = false;
        let mut format = EventFormat::standard();

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                in_events = trimmed.eq_ignore_ascii_case("[events]");
                continue;
            }
            if !in_events {
                continue;
            }

            if let Some(columns) = trimmed.strip_prefix("Format:") {
                match EventFormat::parse(columns) {
                    Some(parsed) => format = parsed,
                    None => warn!("Ignoring [Events] format line without Start/End/Text: {}", trimmed),
                }
            } else if let Some(body) = trimmed.strip_prefix("Dialogue:") {
                match format.parse_dialogue(body.trim_start()) {
                    Some(entry) => entries.push(entry),
                    None => warn!("Skipping malformed ASS dialogue on line {}", line_number + 1),
                }
            } else if !trimmed.is_empty() && !trimmed.starts_with(';') {
                debug!("Ignoring ASS event line {}: {}", line_number + 1, trimmed);
            }
        }

        finish_entries(entries)
    }

    fn serialize(&self, entries: &[SubtitleEntry]) -> String {
        let mut output = String::from(OUTPUT_HEADER);
        for entry in entries {
            output.push_str(&format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
                entry.start.to_ass(),
                entry.end.to_ass(),
                entry.text.replace('\n', "\\N")
            ));
        }
        output
    }
}
