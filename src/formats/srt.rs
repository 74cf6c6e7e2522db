/*!
 * SubRip codec.
 *
 * A cue is a block of lines separated from its neighbours by a blank line:
 * an optional numeric index, a `start --> end` timing line, then text.
 */

use log::warn;

use super::{FormatKind, SubtitleCodec, Timestamp, cue_lines, finish_entries, normalize_content, split_blocks, split_timing_line};
use crate::errors::FormatError;
use crate::subtitle_processor::SubtitleEntry;

/// Reads and writes `.srt` files
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtCodec;

impl SrtCodec {
    fn parse_block(block: &[&str]) -> Option<SubtitleEntry> {
        let timing_at = match block {
            [first, second, ..] if is_index_line(first) && second.contains("-->") => 1,
            [first, ..] if first.contains("-->") => 0,
            _ => return None,
        };

        let (start, end) = split_timing_line(block[timing_at])?;
        let start = Timestamp::parse_srt(start)?;
        let end = Timestamp::parse_srt(end)?;

        let text_lines = &block[timing_at + 1..];
        if text_lines.is_empty() {
            return None;
        }

        let text = text_lines.iter().map(|l| l.trim_end()).collect::<Vec<_>>().join("\n");
        Some(SubtitleEntry::new(0, start, end, text))
    }
}

impl SubtitleCodec for SrtCodec {
    fn kind(&self) -> FormatKind {
        FormatKind::Srt
    }

    fn parse(&self, content: &str) -> Result<Vec<SubtitleEntry>, FormatError> {
        let content = normalize_content(content);
        let mut entries = Vec::new();

        for (block_number, block) in split_blocks(&content).iter().enumerate() {
            match Self::parse_block(block) {
                Some(entry) => entries.push(entry),
                None => warn!(
                    "Skipping malformed SubRip block {}: {:?}",
                    block_number + 1,
                    block.first().copied().unwrap_or_default()
                ),
            }
        }

        finish_entries(entries)
    }

    fn serialize(&self, entries: &[SubtitleEntry]) -> String {
        let mut output = String::new();
        for (position, entry) in entries.iter().enumerate() {
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                position + 1,
                entry.start.to_srt(),
                entry.end.to_srt(),
                cue_lines(&entry.text)
            ));
        }
        output
    }
}

fn is_index_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}
