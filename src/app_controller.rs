use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, Engine};
use crate::clock::TokioSleeper;
use crate::database::{DatabaseConnection, Repository};
use crate::file_utils::FileManager;
use crate::formats;
use crate::language_detector::{Detection, LanguageDetector};
use crate::providers::{Ollama, OpenAI, TranslationProvider};
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{
    BatchReport, BatchTranslator, CacheStats, CancellationFlag, EntryProgress, FileRequest,
    MemoryTranslationCache, RequestPacer, SessionStats, SqliteTranslationCache, TranslationCache,
    TranslationOptions, TranslationService,
};
use crate::errors::TranslationError;

// @module: Application controller for subtitle processing

/// Where translations are cached for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// The SQLite database from the configuration
    Persistent,
    /// A process-local map, discarded at exit
    Memory,
    Disabled,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    cache_mode: CacheMode,
    // @field: Injected provider, replaces the configured engine
    provider: Option<Arc<dyn TranslationProvider>>,
    // @field: Injected cache, replaces the configured one
    cache: Option<Arc<dyn TranslationCache>>,
    cancel: CancellationFlag,
    stats: Arc<SessionStats>,
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let cache_mode = if config.cache_enabled {
            CacheMode::Persistent
        } else {
            CacheMode::Disabled
        };

        Ok(Self {
            config,
            cache_mode,
            provider: None,
            cache: None,
            cancel: CancellationFlag::new(),
            stats: Arc::new(SessionStats::new()),
            show_progress: true,
        })
    }

    /// Use `provider` instead of building one from the configuration
    pub fn with_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use `cache` instead of opening the configured one
    pub fn with_cache(mut self, cache: Arc<dyn TranslationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn with_progress_bars(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Set the cancellation flag when Ctrl-C is pressed
    pub fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing the current entry and stopping");
                cancel.cancel();
            }
        });
    }

    /// Build the provider for the configured engine
    pub fn build_provider(&self) -> Result<Arc<dyn TranslationProvider>> {
        if let Some(provider) = &self.provider {
            return Ok(provider.clone());
        }

        let config = &self.config;
        let timeout = config.request_timeout();
        let provider: Arc<dyn TranslationProvider> = match config.translation_engine {
            Engine::Ollama => Arc::new(Ollama::new(&config.ollama_endpoint, &config.ollama_model, timeout)?),
            Engine::OpenAI => Arc::new(OpenAI::new(
                config.openai_api_key.clone(),
                &config.openai_endpoint,
                &config.openai_model,
                timeout,
            )?),
            Engine::LMStudio => Arc::new(OpenAI::compatible(
                Engine::LMStudio.as_str(),
                String::new(),
                &config.lmstudio_endpoint,
                &config.lmstudio_model,
                timeout,
            )?),
        };
        Ok(provider)
    }

    /// Open the cache selected for this run
    pub fn open_cache(&self) -> Result<Option<Arc<dyn TranslationCache>>> {
        if let Some(cache) = &self.cache {
            return Ok(Some(cache.clone()));
        }

        let cache: Arc<dyn TranslationCache> = match self.cache_mode {
            CacheMode::Disabled => return Ok(None),
            CacheMode::Memory => Arc::new(MemoryTranslationCache::new()),
            CacheMode::Persistent => Arc::new(self.open_sqlite_cache()?),
        };
        Ok(Some(cache))
    }

    fn open_sqlite_cache(&self) -> Result<SqliteTranslationCache> {
        let db = match self.config.cache_file() {
            Some(path) => DatabaseConnection::new(&path)
                .with_context(|| format!("Failed to open translation cache at {:?}", path))?,
            None => DatabaseConnection::new_default().context("Failed to open translation cache")?,
        };
        debug!("Using translation cache at {:?}", db.path());
        Ok(SqliteTranslationCache::new(Repository::new(db)))
    }

    /// Assemble the translation service from the configuration
    pub fn build_service(&self) -> Result<TranslationService> {
        let provider = self.build_provider()?;
        let options = TranslationOptions {
            max_retries: self.config.max_retries.max(1),
            retry_base_delay: self.config.retry_backoff(),
            request_timeout: self.config.request_timeout(),
            engine: provider.name().to_string(),
            ..TranslationOptions::default()
        };

        let mut service = TranslationService::new(provider, options)
            .with_pacer(RequestPacer::new(self.config.delay_between_requests()))
            .with_sleeper(Arc::new(TokioSleeper));
        if let Some(cache) = self.open_cache()? {
            service = service.with_cache(cache);
        }
        Ok(service)
    }

    /// File request built from the configuration defaults
    pub fn default_request(&self) -> FileRequest {
        FileRequest {
            source_language: self.config.default_source_language.clone(),
            target_language: self.config.default_target_language.clone(),
            output_format: self.config.output_format.format_kind(),
            output_suffix: self.config.output_suffix.clone(),
            output_dir: None,
            create_backup: self.config.create_backup,
            force_overwrite: false,
            concurrency: self.config.concurrent_files.max(1),
        }
    }

    /// Translate a file or every subtitle file in a directory
    pub async fn run(&self, input: &Path, output: Option<&Path>, request: &FileRequest) -> Result<BatchReport> {
        self.config.validate().context("Invalid configuration")?;
        let service = self.build_service()?;
        let provider = service.provider().clone();
        info!(
            "Translating {} -> {} with {} ({})",
            request.source_language,
            request.target_language,
            self.config.translation_engine.display_name(),
            self.config.engine_model()
        );
        if let Err(e) = provider.test_connection().await {
            warn!("{} is not reachable yet: {}", provider.name(), e);
        }

        let multi_progress = MultiProgress::new();
        let mut translator = BatchTranslator::new(service);
        if self.show_progress {
            translator = translator.with_progress(progress_reporter(multi_progress.clone()));
        }

        if FileManager::dir_exists(input) {
            let request = FileRequest {
                output_dir: output.map(Path::to_path_buf).or_else(|| request.output_dir.clone()),
                ..request.clone()
            };
            return translator
                .translate_directory(input, &request, &self.stats, &self.cancel)
                .await
                .map_err(|e| anyhow!(e));
        }

        let mut report = BatchReport::default();
        match translator
            .translate_file(input, output, request, &self.stats, &self.cancel)
            .await
        {
            Ok(path) => report.outputs.push(path),
            Err(TranslationError::Cancelled) => report.cancelled = true,
            Err(e) => report.failures.push((input.to_path_buf(), e)),
        }
        Ok(report)
    }

    /// Detect the language of a subtitle file
    pub fn detect(&self, path: &Path) -> Result<(formats::FormatKind, usize, Detection)> {
        let collection = SubtitleCollection::load(path)?;
        let detection = LanguageDetector::new().detect_entries(&collection.entries);
        Ok((collection.format, collection.len(), detection))
    }

    pub async fn cache_stats(&self) -> Result<CacheStats> {
        let cache = self.open_cache()?.ok_or_else(|| anyhow!("Translation cache is disabled"))?;
        Ok(cache.stats().await)
    }

    /// Remove single-use entries older than `days` (the configured age by default)
    pub async fn cache_clean(&self, days: Option<u32>) -> Result<usize> {
        let cache = self.open_cache()?.ok_or_else(|| anyhow!("Translation cache is disabled"))?;
        let max_age = match days {
            Some(days) => std::time::Duration::from_secs(u64::from(days) * 24 * 60 * 60),
            None => self.config.cache_max_age(),
        };
        Ok(cache.evict_older_than(max_age).await)
    }

    pub async fn cache_clear(&self) -> Result<()> {
        let cache = self.open_cache()?.ok_or_else(|| anyhow!("Translation cache is disabled"))?;
        if cache.clear().await {
            Ok(())
        } else {
            Err(anyhow!("Failed to clear the translation cache"))
        }
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

/// One progress bar per file, created on the file's first entry
fn progress_reporter(multi_progress: MultiProgress) -> Arc<dyn Fn(&Path, &EntryProgress) + Send + Sync> {
    let bars: Mutex<HashMap<PathBuf, ProgressBar>> = Mutex::new(HashMap::new());

    Arc::new(move |path: &Path, progress: &EntryProgress| {
        let mut bars = bars.lock();
        let bar = bars.entry(path.to_path_buf()).or_insert_with(|| {
            let bar = multi_progress.add(ProgressBar::new(progress.total as u64));
            bar.set_style(bar_style());
            bar.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            bar
        });
        bar.set_position(progress.position as u64);
        if progress.position >= progress.total {
            bar.finish();
        }
    })
}
