use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::formats::FormatKind;

// @module: File and directory utilities

/// Directory created beside an input to hold its backups
pub const BACKUP_DIR: &str = "backups";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<stem><suffix>.<extension>` beside the input
    pub fn output_path_for<P: AsRef<Path>>(input_file: P, suffix: &str, extension: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = format!("{}{}.{}", stem, suffix, extension);

        match input_file.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Whether the file stem already ends with the output suffix
    pub fn has_suffix<P: AsRef<Path>>(path: P, suffix: &str) -> bool {
        !suffix.is_empty()
            && path
                .as_ref()
                .file_stem()
                .map(|stem| stem.to_string_lossy().ends_with(suffix))
                .unwrap_or(false)
    }

    /// Find subtitle files under `dir`, recursively and in path order
    ///
    /// Files whose stem already ends with `exclude_suffix` are earlier outputs
    /// and are left out, as is anything under a `backups` directory.
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P, exclude_suffix: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        let walker = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.depth() > 0 && e.file_type().is_dir() && e.file_name() == BACKUP_DIR));

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let known = path
                .extension()
                .and_then(|ext| FormatKind::from_extension(&ext.to_string_lossy()))
                .is_some();
            if known && !Self::has_suffix(path, exclude_suffix) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Copy `path` to `<dir>/backups/<stem>_<YYYYmmdd_HHMMSS_mmm>[_N].<ext>`
    pub fn backup_file<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let extension = path.extension().map(|ext| format!(".{}", ext.to_string_lossy()));
        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let backup_dir = path.parent().unwrap_or_else(|| Path::new("")).join(BACKUP_DIR);

        // Same-millisecond backups get a counter instead of overwriting each other
        let mut attempt = 0;
        let backup_path = loop {
            let counter = if attempt == 0 { String::new() } else { format!("_{}", attempt) };
            let candidate = backup_dir.join(format!(
                "{}_{}{}{}",
                stem,
                timestamp,
                counter,
                extension.as_deref().unwrap_or_default()
            ));
            if !candidate.exists() {
                break candidate;
            }
            attempt += 1;
        };
        Self::copy_file(path, &backup_path)?;

        Ok(backup_path)
    }
}
