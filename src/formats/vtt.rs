/*!
 * WebVTT codec.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FormatKind, SubtitleCodec, Timestamp, cue_lines, finish_entries, normalize_content, split_blocks, split_timing_line};
use crate::errors::FormatError;
use crate::subtitle_processor::SubtitleEntry;

pub(crate) static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Blocks that carry no cues
const NON_CUE_BLOCKS: [&str; 4] = ["WEBVTT", "NOTE", "STYLE", "REGION"];

/// Reads and writes `.vtt` files
#[derive(Debug, Clone, Copy, Default)]
pub struct VttCodec;

impl VttCodec {
    fn parse_cue(block: &[&str]) -> Option<SubtitleEntry> {
        let timing_at = block.iter().position(|line| line.contains("-->"))?;
        // Only an optional identifier line may precede the timing
        if timing_at > 1 {
            return None;
        }

        let (start, end) = split_timing_line(block[timing_at])?;
        let start = Timestamp::parse_vtt(start)?;
        let end = Timestamp::parse_vtt(end)?;

        let text_lines = &block[timing_at + 1..];
        if text_lines.is_empty() {
            return None;
        }

        let text = text_lines
            .iter()
            .map(|line| decode_entities(&TAG_REGEX.replace_all(line, "")).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Some(SubtitleEntry::new(0, start, end, text.trim()))
    }
}

fn is_non_cue_block(first_line: &str) -> bool {
    NON_CUE_BLOCKS.iter().any(|keyword| {
        first_line
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn encode_entities(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl SubtitleCodec for VttCodec {
    fn kind(&self) -> FormatKind {
        FormatKind::Vtt
    }

    fn parse(&self, content: &str) -> Result<Vec<SubtitleEntry>, FormatError> {
        let content = normalize_content(content);
        let mut entries = Vec::new();

        for (block_number, block) in split_blocks(&content).iter().enumerate() {
            let first = block.first().copied().unwrap_or_default().trim();
            if is_non_cue_block(first) {
                continue;
            }

            match Self::parse_cue(block) {
                Some(entry) => entries.push(entry),
                None => warn!("Skipping malformed WebVTT cue {}: {:?}", block_number + 1, first),
            }
        }

        finish_entries(entries)
    }

    fn serialize(&self, entries: &[SubtitleEntry]) -> String {
        let mut output = String::from("WEBVTT\n\n");
        for (position, entry) in entries.iter().enumerate() {
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                position + 1,
                entry.start.to_vtt(),
                entry.end.to_vtt(),
                encode_entities(&cue_lines(&entry.text))
            ));
        }
        output
    }
}
