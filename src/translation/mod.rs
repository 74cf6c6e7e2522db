/*!
 * Translation of subtitle entries and files.
 *
 * This module contains the translation pipeline. It is split into several submodules:
 *
 * - `core`: Per-text translation with caching, retries, pacing and cancellation
 * - `batch`: Whole-file and multi-file translation
 * - `cache`: Persistent and in-memory translation caches
 * - `pacing`: Global minimum spacing between provider calls
 * - `stats`: Session counters
 */

// Re-export main types for easier usage
pub use self::batch::{BatchReport, BatchTranslator, FALLBACK_SOURCE_LANGUAGE, FileProgressCallback, FileRequest};
pub use self::cache::{CacheStats, MemoryTranslationCache, SqliteTranslationCache, TranslationCache};
pub use self::core::{
    CancellationFlag, EntryProgress, ProgressCallback, SequenceOutcome, TranslationOptions, TranslationService,
    is_ornamental,
};
pub use self::pacing::RequestPacer;
pub use self::stats::{SessionStats, StatsSnapshot};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod pacing;
pub mod stats;
