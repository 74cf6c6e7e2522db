/*!
 * Database entity models.
 *
 * These structures map directly to the `translation_cache` table.
 */

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the translation cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Database ID (0 until inserted)
    pub id: i64,
    /// Hash of the trimmed text and language pair
    pub text_hash: String,
    /// Trimmed source text
    pub source_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Name of the provider that produced the translation
    pub engine: String,
    /// Unix milliseconds
    pub created_at: i64,
    /// Unix milliseconds
    pub last_used_at: i64,
    pub usage_count: i64,
}

impl CacheRecord {
    /// Create a fresh record stamped with `now_ms`
    pub fn new(
        text_hash: String,
        source_text: String,
        translated_text: String,
        source_language: String,
        target_language: String,
        engine: String,
        now_ms: i64,
    ) -> Self {
        Self {
            id: 0,
            text_hash,
            source_text,
            translated_text,
            source_language,
            target_language,
            engine,
            created_at: now_ms,
            last_used_at: now_ms,
            usage_count: 1,
        }
    }

    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_used_at).single()
    }
}

/// Aggregate numbers over the whole cache table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheTableStats {
    pub total_entries: i64,
    pub total_usage: i64,
    /// `(target_language, entries)`, largest first
    pub per_target_language: Vec<(String, i64)>,
    /// `page_count * page_size` as reported by SQLite
    pub storage_size_bytes: i64,
}

impl fmt::Display for CacheTableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entries: {}, Uses: {}, Size: {} KB",
            self.total_entries,
            self.total_usage,
            self.storage_size_bytes / 1024
        )
    }
}
