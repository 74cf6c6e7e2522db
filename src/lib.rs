/*!
 * # subtrans - subtitle translation with language models
 *
 * A Rust library for translating subtitle files entry by entry.
 *
 * ## Features
 *
 * - Read and write SubRip (SRT), Advanced SubStation Alpha (ASS) and WebVTT
 * - Translate subtitles using:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - LM Studio (OpenAI-compatible local server)
 * - Persistent SQLite translation cache with usage tracking and eviction
 * - Retries with linear backoff, request pacing and cancellation
 * - Heuristic source language detection
 * - Concurrent batch processing of directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `formats`: Subtitle codecs and format detection
 * - `subtitle_processor`: Subtitle entries and collections
 * - `translation`: Translation pipeline:
 *   - `translation::core`: Per-text translation, retries and cancellation
 *   - `translation::batch`: File and batch processing
 *   - `translation::cache`: Translation caches
 * - `database`: SQLite storage behind the persistent cache
 * - `language_detector`: Heuristic language detection
 * - `language_utils`: ISO language code utilities
 * - `providers`: Clients for the translation engines
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod clock;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod language_detector;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{CacheError, ConfigError, FormatError, ProviderError, TranslationError, ValidationError};
pub use formats::FormatKind;
pub use language_detector::{Detection, LanguageDetector};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{BatchTranslator, TranslationCache, TranslationService};
