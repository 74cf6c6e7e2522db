/*!
 * Common test utilities for the subtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use subtrans::providers::MockProvider;
use subtrans::translation::{FileRequest, MemoryTranslationCache, TranslationOptions, TranslationService};

pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

pub const SAMPLE_ASS: &str = "[Script Info]
Title: Sample
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Default,Arial,20

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.50,0:00:03.00,Default,,0,0,0,,{\\b1}Hello{\\b0} there
Dialogue: 0,0:00:04.00,0:00:06.25,Default,,0,0,0,,First line\\NSecond line
";

pub const SAMPLE_VTT: &str = "WEBVTT

NOTE generated for tests

1
00:00:01.000 --> 00:00:02.500
<i>Hello</i>

2
00:00:03.000 --> 00:00:04.000
Goodbye
";

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample SubRip file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Options with no waiting between retries
pub fn fast_options() -> TranslationOptions {
    TranslationOptions {
        retry_base_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..TranslationOptions::default()
    }
}

/// Service around `provider` with an in-memory cache
pub fn service_with(provider: MockProvider) -> (TranslationService, Arc<MemoryTranslationCache>) {
    let cache = Arc::new(MemoryTranslationCache::new());
    let service = TranslationService::new(Arc::new(provider), fast_options()).with_cache(cache.clone());
    (service, cache)
}

/// English to French, no backups, overwriting allowed
pub fn en_to_fr() -> FileRequest {
    FileRequest {
        source_language: "en".to_string(),
        target_language: "fr".to_string(),
        create_backup: false,
        force_overwrite: true,
        ..FileRequest::default()
    }
}
