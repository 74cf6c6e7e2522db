/*!
 * Session statistics.
 *
 * Counters are atomics so one `SessionStats` can be shared by every file
 * worker of a batch.
 */

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Running counters for one translation session
#[derive(Debug)]
pub struct SessionStats {
    pub files_processed: AtomicUsize,
    pub files_failed: AtomicUsize,
    pub entries_translated: AtomicUsize,
    pub cache_hits: AtomicUsize,
    pub provider_calls: AtomicUsize,
    pub translation_errors: AtomicUsize,
    pub skipped: AtomicUsize,
    started_at: Instant,
}

/// Point-in-time copy of [`SessionStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub files_processed: usize,
    pub files_failed: usize,
    pub entries_translated: usize,
    pub cache_hits: usize,
    pub provider_calls: usize,
    pub translation_errors: usize,
    pub skipped: usize,
    pub duration_secs: f64,
    /// Percentage of cache hits among cache hits plus provider calls
    pub cache_hit_rate: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            files_processed: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            entries_translated: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            provider_calls: AtomicUsize::new(0),
            translation_errors: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicUsize, amount: usize) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        hit_rate(
            self.cache_hits.load(Ordering::Relaxed),
            self.provider_calls.load(Ordering::Relaxed),
        )
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let provider_calls = self.provider_calls.load(Ordering::Relaxed);

        StatsSnapshot {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            entries_translated: self.entries_translated.load(Ordering::Relaxed),
            cache_hits,
            provider_calls,
            translation_errors: self.translation_errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            duration_secs: self.elapsed().as_secs_f64(),
            cache_hit_rate: hit_rate(cache_hits, provider_calls),
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

fn hit_rate(cache_hits: usize, provider_calls: usize) -> f64 {
    let lookups = cache_hits + provider_calls;
    if lookups == 0 {
        0.0
    } else {
        cache_hits as f64 / lookups as f64 * 100.0
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session Summary:")?;
        writeln!(f, "  Files processed:    {}", self.files_processed)?;
        writeln!(f, "  Files failed:       {}", self.files_failed)?;
        writeln!(f, "  Entries translated: {}", self.entries_translated)?;
        writeln!(f, "  Cache hits:         {}", self.cache_hits)?;
        writeln!(f, "  Provider calls:     {}", self.provider_calls)?;
        writeln!(f, "  Translation errors: {}", self.translation_errors)?;
        writeln!(f, "  Skipped entries:    {}", self.skipped)?;
        writeln!(f, "  Cache hit rate:     {:.1}%", self.cache_hit_rate)?;
        write!(f, "  Duration:           {:.1}s", self.duration_secs)
    }
}
