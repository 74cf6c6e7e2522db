use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::FormatError;
use crate::file_utils::FileManager;
use crate::formats::{self, FormatKind, Timestamp};

// @module: Subtitle entries and collections

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: 1-based position inside its file
    pub index: usize,

    // @field: Cue start
    pub start: Timestamp,

    // @field: Cue end
    pub end: Timestamp,

    // @field: Plain text, lines separated by '\n'
    pub text: String,

    // @field: ASS override blocks removed from the text
    pub style_hints: Option<String>,
}

impl SubtitleEntry {
    pub fn new(index: usize, start: Timestamp, end: Timestamp, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start,
            end,
            text: text.into(),
            style_hints: None,
        }
    }

    /// Convenience constructor taking millisecond offsets
    pub fn from_millis(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self::new(index, Timestamp::from_millis(start_ms), Timestamp::from_millis(end_ms), text)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end.as_millis().saturating_sub(self.start.as_millis())
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start.to_srt(), self.end.to_srt())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries with metadata
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File the entries were read from
    pub source_file: PathBuf,

    /// Format the entries were parsed from
    pub format: FormatKind,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    pub fn new(source_file: PathBuf, format: FormatKind, entries: Vec<SubtitleEntry>) -> Self {
        Self {
            source_file,
            format,
            entries,
        }
    }

    /// Parse already-loaded content
    pub fn parse_content(source_file: PathBuf, format: FormatKind, content: &str) -> Result<Self, FormatError> {
        let entries = formats::parse(content, format)?;
        debug!("Parsed {} {} entries from {:?}", entries.len(), format.display_name(), source_file);
        Ok(Self::new(source_file, format, entries))
    }

    /// Read and parse a file, detecting its format from the extension or content
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let format = formats::detect_format(path, Some(&content))
            .ok_or_else(|| FormatError::Unsupported(path.display().to_string()))?;
        Self::parse_content(path.to_path_buf(), format, &content)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} entries, {})",
            self.source_file.display(),
            self.entries.len(),
            self.format.display_name()
        )
    }
}
