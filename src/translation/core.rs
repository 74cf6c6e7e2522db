/*!
 * Core translation service implementation.
 *
 * `TranslationService` turns one piece of subtitle text into its translation:
 * skip what needs no translation, consult the cache, then call the provider
 * with pacing, a timeout and bounded retries. A text that cannot be
 * translated comes back unchanged so a single bad entry never loses a file.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::cache::TranslationCache;
use super::pacing::RequestPacer;
use super::stats::SessionStats;
use crate::clock::{Sleeper, TokioSleeper};
use crate::errors::{CacheError, ProviderError};
use crate::providers::TranslationProvider;
use crate::subtitle_processor::SubtitleEntry;

/// Characters that make up decorative lines such as `--`, `...` or `♪♪`
const ORNAMENT_CHARS: &[char] = &['-', '.', '…', '–', '—', '♪', '♫', '♬', '♩', '*', '~'];

/// Whether `text` needs no translation: blank, or made only of ornaments
pub fn is_ornamental(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || ORNAMENT_CHARS.contains(&c))
}

/// Cooperative cancellation shared between the caller and running work
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress report emitted after each entry of a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct EntryProgress {
    /// 1-based position of the entry just handled
    pub position: usize,
    pub total: usize,
    pub original: String,
    pub translated: String,
}

/// How far a sequence got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Entries handled before stopping
    pub completed: usize,
    pub cancelled: bool,
}

/// Callback fed with per-entry progress
pub type ProgressCallback<'a> = &'a (dyn Fn(&EntryProgress) + Send + Sync);

/// Translation options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Total provider attempts per text, at least 1
    pub max_retries: u32,
    /// Attempt `k` waits `retry_base_delay * (k - 1)` first
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
    pub cache_timeout: Duration,
    /// Engine name stored with cached translations; empty means the provider name
    pub engine: String,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
            cache_timeout: Duration::from_secs(5),
            engine: String::new(),
        }
    }
}

/// Main translation service for subtitle translation
#[derive(Clone)]
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    cache: Option<Arc<dyn TranslationCache>>,
    pacer: RequestPacer,
    sleeper: Arc<dyn Sleeper>,
    pub options: TranslationOptions,
}

impl TranslationService {
    /// Create a service without cache or pacing
    pub fn new(provider: Arc<dyn TranslationProvider>, options: TranslationOptions) -> Self {
        Self {
            provider,
            cache: None,
            pacer: RequestPacer::unlimited(),
            sleeper: Arc::new(TokioSleeper),
            options,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn TranslationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn provider(&self) -> &Arc<dyn TranslationProvider> {
        &self.provider
    }

    pub fn cache(&self) -> Option<&Arc<dyn TranslationCache>> {
        self.cache.as_ref()
    }

    pub fn engine(&self) -> &str {
        if self.options.engine.is_empty() {
            self.provider.name()
        } else {
            &self.options.engine
        }
    }

    /// Translate one text, falling back to the original on failure
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        stats: &SessionStats,
    ) -> String {
        if is_ornamental(text) {
            SessionStats::bump(&stats.skipped);
            return text.to_string();
        }

        if let Some(cached) = self.cached(text, source_language, target_language).await {
            SessionStats::bump(&stats.cache_hits);
            return cached;
        }

        match self.translate_with_retry(text, source_language, target_language).await {
            Ok(translated) => {
                self.remember(text, &translated, source_language, target_language).await;
                SessionStats::bump(&stats.provider_calls);
                translated
            }
            Err(e) => {
                SessionStats::bump(&stats.translation_errors);
                warn!(
                    "Translation failed after {} attempt(s), keeping original text {:?}: {}",
                    self.options.max_retries.max(1),
                    preview(text),
                    e
                );
                text.to_string()
            }
        }
    }

    /// Translate entries in place, in order, stopping early on cancellation
    pub async fn translate_entry_sequence(
        &self,
        entries: &mut [SubtitleEntry],
        source_language: &str,
        target_language: &str,
        stats: &SessionStats,
        cancel: &CancellationFlag,
        progress: Option<ProgressCallback<'_>>,
    ) -> SequenceOutcome {
        let total = entries.len();

        for (i, entry) in entries.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                debug!("Cancelled after {} of {} entries", i, total);
                return SequenceOutcome {
                    completed: i,
                    cancelled: true,
                };
            }

            let translated = self
                .translate_text(&entry.text, source_language, target_language, stats)
                .await;

            if let Some(report) = progress {
                report(&EntryProgress {
                    position: i + 1,
                    total,
                    original: entry.text.clone(),
                    translated: translated.clone(),
                });
            }
            entry.text = translated;
        }

        SequenceOutcome {
            completed: total,
            cancelled: false,
        }
    }

    async fn cached(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match tokio::time::timeout(
            self.options.cache_timeout,
            cache.lookup(text, source_language, target_language),
        )
        .await
        {
            Ok(found) => found,
            Err(_) => {
                warn!("Translation cache lookup failed: {}", CacheError::Timeout);
                None
            }
        }
    }

    async fn remember(&self, text: &str, translated: &str, source_language: &str, target_language: &str) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let store = cache.store(text, translated, source_language, target_language, self.engine());
        if tokio::time::timeout(self.options.cache_timeout, store).await.is_err() {
            warn!("Translation cache store failed: {}", CacheError::Timeout);
        }
    }

    async fn translate_with_retry(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let attempts = self.options.max_retries.max(1);
        let mut last_error = ProviderError::EmptyResponse;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.options.retry_base_delay * (attempt - 1);
                debug!("Retrying translation (attempt {}/{}) after {:?}", attempt, attempts, delay);
                self.sleeper.sleep(delay).await;
            }

            match self.attempt(text, source_language, target_language).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    debug!("Attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn attempt(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        self.pacer.wait().await;

        let timeout = self.options.request_timeout;
        let translated = tokio::time::timeout(timeout, self.provider.translate(text, source_language, target_language))
            .await
            .map_err(|_| ProviderError::Timeout(timeout.as_millis() as u64))??;

        if translated.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(translated)
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 40;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    }
}
