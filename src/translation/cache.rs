/*!
 * Translation caching functionality.
 *
 * A cache maps `(trimmed text, source language, target language)` to the last
 * stored translation. Two implementations share the [`TranslationCache`]
 * contract:
 *
 * - [`SqliteTranslationCache`]: durable, backed by the `database` module
 * - [`MemoryTranslationCache`]: process-local, used by tests and `--memory-cache`
 *
 * Storage failures never escape a cache. They are logged and reported as a
 * miss, `false`, `0` or empty statistics.
 */

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::database::{CacheRecord, CacheTableStats, Repository};
use crate::errors::CacheError;

/// Snapshot of cache contents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_usage: u64,
    /// `(target_language, entries)`, largest first
    pub per_target_language: Vec<(String, u64)>,
    pub storage_size_bytes: u64,
    /// `(total_usage / total_entries - 1) * 100`, 0 when empty
    pub hit_potential: f64,
}

impl CacheStats {
    fn from_counts(
        total_entries: u64,
        total_usage: u64,
        mut per_target_language: Vec<(String, u64)>,
        storage_size_bytes: u64,
    ) -> Self {
        per_target_language.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let hit_potential = if total_entries == 0 {
            0.0
        } else {
            (total_usage as f64 / total_entries as f64 - 1.0) * 100.0
        };

        Self {
            total_entries,
            total_usage,
            per_target_language,
            storage_size_bytes,
            hit_potential,
        }
    }
}

impl From<CacheTableStats> for CacheStats {
    fn from(table: CacheTableStats) -> Self {
        Self::from_counts(
            table.total_entries.max(0) as u64,
            table.total_usage.max(0) as u64,
            table
                .per_target_language
                .into_iter()
                .map(|(lang, count)| (lang, count.max(0) as u64))
                .collect(),
            table.storage_size_bytes.max(0) as u64,
        )
    }
}

/// Contract shared by every translation cache
#[async_trait]
pub trait TranslationCache: Send + Sync {
    /// Stored translation for the key, recording the use on a hit
    async fn lookup(&self, text: &str, source_language: &str, target_language: &str) -> Option<String>;

    /// Store a translation. `false` when either text is blank or storage failed.
    async fn store(
        &self,
        text: &str,
        translated: &str,
        source_language: &str,
        target_language: &str,
        engine: &str,
    ) -> bool;

    /// Remove single-use entries not used within `max_age`; returns the count removed
    async fn evict_older_than(&self, max_age: Duration) -> usize;

    /// Remove everything
    async fn clear(&self) -> bool;

    async fn stats(&self) -> CacheStats;
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn age_to_millis(max_age: Duration) -> i64 {
    i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX)
}

fn report(operation: &str, error: CacheError) {
    warn!("Translation cache {} failed: {}", operation, error);
}

/// Durable cache backed by SQLite
#[derive(Clone)]
pub struct SqliteTranslationCache {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl SqliteTranslationCache {
    pub fn new(repository: Repository) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Open (or create) the cache database at `path`
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let db = crate::database::DatabaseConnection::new(path)?;
        Ok(Self::new(Repository::new(db)))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Repository::new_in_memory()?))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

#[async_trait]
impl TranslationCache for SqliteTranslationCache {
    async fn lookup(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        if is_blank(text) {
            return None;
        }

        let hash = Repository::hash_text(text, source_language, target_language);
        match self.repository.get_cached_translation(&hash, self.clock.now_millis()).await {
            Ok(found) => found,
            Err(e) => {
                report("lookup", e.into());
                None
            }
        }
    }

    async fn store(
        &self,
        text: &str,
        translated: &str,
        source_language: &str,
        target_language: &str,
        engine: &str,
    ) -> bool {
        if is_blank(text) || is_blank(translated) {
            return false;
        }

        let record = CacheRecord::new(
            Repository::hash_text(text, source_language, target_language),
            text.trim().to_string(),
            translated.to_string(),
            source_language.to_string(),
            target_language.to_string(),
            engine.to_string(),
            self.clock.now_millis(),
        );

        match self.repository.cache_translation(&record).await {
            Ok(()) => true,
            Err(e) => {
                report("store", e.into());
                false
            }
        }
    }

    async fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now_millis().saturating_sub(age_to_millis(max_age));
        match self.repository.evict_unused_before(cutoff).await {
            Ok(removed) => {
                debug!("Evicted {} unused cache entries", removed);
                removed
            }
            Err(e) => {
                report("eviction", e.into());
                0
            }
        }
    }

    async fn clear(&self) -> bool {
        match self.repository.clear_cache().await {
            Ok(_) => {
                if let Err(e) = self.repository.connection().vacuum().await {
                    debug!("Vacuum after clear failed: {}", e);
                }
                true
            }
            Err(e) => {
                report("clear", e.into());
                false
            }
        }
    }

    async fn stats(&self) -> CacheStats {
        match self.repository.get_cache_stats().await {
            Ok(table) => table.into(),
            Err(e) => {
                report("stats", e.into());
                CacheStats::default()
            }
        }
    }
}

/// Cache key combining trimmed source text and the language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    source_language: String,
    target_language: String,
}

impl CacheKey {
    fn new(source_text: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.trim().to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    translated_text: String,
    last_used_at: i64,
    usage_count: u64,
}

/// Process-local cache with the same semantics as the SQLite one
#[derive(Clone)]
pub struct MemoryTranslationCache {
    entries: Arc<RwLock<HashMap<CacheKey, MemoryEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTranslationCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current usage count of a key, without recording a use
    pub fn usage_count(&self, text: &str, source_language: &str, target_language: &str) -> Option<u64> {
        self.entries
            .read()
            .get(&CacheKey::new(text, source_language, target_language))
            .map(|e| e.usage_count)
    }
}

impl Default for MemoryTranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationCache for MemoryTranslationCache {
    async fn lookup(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        if is_blank(text) {
            return None;
        }

        let key = CacheKey::new(text, source_language, target_language);
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&key)?;
        entry.last_used_at = self.clock.now_millis();
        entry.usage_count += 1;
        Some(entry.translated_text.clone())
    }

    async fn store(
        &self,
        text: &str,
        translated: &str,
        source_language: &str,
        target_language: &str,
        _engine: &str,
    ) -> bool {
        if is_blank(text) || is_blank(translated) {
            return false;
        }

        let key = CacheKey::new(text, source_language, target_language);
        self.entries.write().insert(
            key,
            MemoryEntry {
                translated_text: translated.to_string(),
                last_used_at: self.clock.now_millis(),
                usage_count: 1,
            },
        );
        true
    }

    async fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now_millis().saturating_sub(age_to_millis(max_age));
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !(e.last_used_at < cutoff && e.usage_count == 1));
        before - entries.len()
    }

    async fn clear(&self) -> bool {
        self.entries.write().clear();
        true
    }

    async fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut per_target: HashMap<String, u64> = HashMap::new();
        let mut total_usage = 0;
        for (key, entry) in entries.iter() {
            *per_target.entry(key.target_language.clone()).or_default() += 1;
            total_usage += entry.usage_count;
        }

        CacheStats::from_counts(entries.len() as u64, total_usage, per_target.into_iter().collect(), 0)
    }
}
