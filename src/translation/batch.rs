/*!
 * File and batch translation.
 *
 * `BatchTranslator` drives whole files through the pipeline: validate the
 * paths, parse, back up, resolve the source language, translate entry by
 * entry and write the result. Batches run several files at once, each file
 * strictly sequential inside.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::core::{CancellationFlag, EntryProgress, TranslationService};
use super::stats::SessionStats;
use crate::errors::{TranslationError, ValidationError};
use crate::file_utils::FileManager;
use crate::formats::{self, FormatKind};
use crate::language_detector::LanguageDetector;
use crate::language_utils;

/// Source language used when detection finds nothing
pub const FALLBACK_SOURCE_LANGUAGE: &str = "en";

/// Per-file progress callback, called with the input path
pub type FileProgressCallback = Arc<dyn Fn(&Path, &EntryProgress) + Send + Sync>;

/// What to do with each file
#[derive(Debug, Clone)]
pub struct FileRequest {
    /// Source language code, or `auto`
    pub source_language: String,
    pub target_language: String,
    /// Output format; `None` keeps the input format
    pub output_format: Option<FormatKind>,
    /// Appended to the input stem for default output names
    pub output_suffix: String,
    /// Directory for default output names; `None` writes beside the input
    pub output_dir: Option<PathBuf>,
    pub create_backup: bool,
    pub force_overwrite: bool,
    /// Files translated at once by a batch
    pub concurrency: usize,
}

impl Default for FileRequest {
    fn default() -> Self {
        Self {
            source_language: language_utils::AUTO.to_string(),
            target_language: "ar".to_string(),
            output_format: None,
            output_suffix: "_translated".to_string(),
            output_dir: None,
            create_backup: true,
            force_overwrite: false,
            concurrency: 2,
        }
    }
}

/// Outcome of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, TranslationError)>,
    /// Some files were not finished because the run was cancelled
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Batch translator for processing whole subtitle files
#[derive(Clone)]
pub struct BatchTranslator {
    service: TranslationService,
    detector: LanguageDetector,
    progress: Option<FileProgressCallback>,
}

impl BatchTranslator {
    pub fn new(service: TranslationService) -> Self {
        Self {
            service,
            detector: LanguageDetector::new(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: FileProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Translate one file and return the path written
    pub async fn translate_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        request: &FileRequest,
        stats: &SessionStats,
        cancel: &CancellationFlag,
    ) -> Result<PathBuf, TranslationError> {
        let result = self.run_file(input, output, request, stats, cancel).await;

        match &result {
            Ok(path) => {
                SessionStats::bump(&stats.files_processed);
                info!("Translated {:?} -> {:?}", input, path);
            }
            Err(TranslationError::Cancelled) => {
                warn!("Translation of {:?} cancelled, nothing written", input);
            }
            Err(e) => {
                SessionStats::bump(&stats.files_failed);
                error!("Failed to translate {:?}: {}", input, e);
            }
        }

        result
    }

    async fn run_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        request: &FileRequest,
        stats: &SessionStats,
        cancel: &CancellationFlag,
    ) -> Result<PathBuf, TranslationError> {
        if !FileManager::file_exists(input) {
            return Err(ValidationError::MissingInput(input.to_path_buf()).into());
        }

        let content = FileManager::read_to_string(input).map_err(|e| TranslationError::Read {
            path: input.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let input_format = formats::detect_format(input, Some(&content))
            .ok_or_else(|| ValidationError::UnsupportedFormat(input.to_path_buf()))?;
        let output_format = request.output_format.unwrap_or(input_format);
        let output_path = resolve_output(input, output, output_format, request)?;

        let mut entries = formats::parse(&content, input_format).map_err(|source| TranslationError::Format {
            path: input.to_path_buf(),
            source,
        })?;
        debug!("{:?}: {} {} entries", input, entries.len(), input_format.display_name());

        if request.create_backup {
            match FileManager::backup_file(input) {
                Ok(backup) => debug!("Backed up {:?} to {:?}", input, backup),
                Err(e) => warn!("Could not back up {:?}: {:#}", input, e),
            }
        }

        let source_language = if language_utils::is_auto(&request.source_language) {
            let detection = self.detector.detect_entries(&entries);
            let code = detection.language_or(FALLBACK_SOURCE_LANGUAGE);
            info!(
                "Detected source language of {:?}: {} (confidence {:.2})",
                input, code, detection.confidence
            );
            code.to_string()
        } else {
            request.source_language.clone()
        };

        let report = self
            .progress
            .as_ref()
            .map(|callback| move |progress: &EntryProgress| callback(input, progress));
        let outcome = self
            .service
            .translate_entry_sequence(
                &mut entries,
                &source_language,
                &request.target_language,
                stats,
                cancel,
                report.as_ref().map(|r| r as &(dyn Fn(&EntryProgress) + Send + Sync)),
            )
            .await;
        SessionStats::add(&stats.entries_translated, outcome.completed);

        if outcome.cancelled {
            return Err(TranslationError::Cancelled);
        }

        let rendered = formats::serialize(&entries, output_format);
        FileManager::write_to_file(&output_path, &rendered).map_err(|e| TranslationError::OutputWrite {
            path: output_path.clone(),
            message: format!("{:#}", e),
        })?;

        Ok(output_path)
    }

    /// Translate several files, up to `request.concurrency` at a time
    pub async fn translate_batch(
        &self,
        inputs: &[PathBuf],
        request: &FileRequest,
        stats: &SessionStats,
        cancel: &CancellationFlag,
    ) -> BatchReport {
        let conflicts = duplicate_outputs(inputs, request);

        let mut results = stream::iter(inputs.iter().zip(conflicts).enumerate())
            .map(|(index, (input, conflict))| async move {
                let result = if cancel.is_cancelled() {
                    Err(TranslationError::Cancelled)
                } else if let Some(output) = conflict {
                    SessionStats::bump(&stats.files_failed);
                    let e = TranslationError::from(ValidationError::DuplicateOutput(output));
                    error!("Failed to translate {:?}: {}", input, e);
                    Err(e)
                } else {
                    self.translate_file(input, None, request, stats, cancel).await
                };
                (index, input.clone(), result)
            })
            .buffer_unordered(request.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        // Restore input order
        results.sort_by_key(|(index, _, _)| *index);

        let mut report = BatchReport::default();
        for (_, input, result) in results {
            match result {
                Ok(path) => report.outputs.push(path),
                Err(TranslationError::Cancelled) => report.cancelled = true,
                Err(e) => report.failures.push((input, e)),
            }
        }

        info!(
            "Batch finished: {} translated, {} failed{}",
            report.outputs.len(),
            report.failures.len(),
            if report.cancelled { ", cancelled" } else { "" }
        );
        report
    }

    /// Translate every subtitle file under `dir`
    pub async fn translate_directory(
        &self,
        dir: &Path,
        request: &FileRequest,
        stats: &SessionStats,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, TranslationError> {
        if !FileManager::dir_exists(dir) {
            return Err(ValidationError::NotADirectory(dir.to_path_buf()).into());
        }

        let inputs =
            FileManager::find_subtitle_files(dir, &request.output_suffix).map_err(|e| TranslationError::Read {
                path: dir.to_path_buf(),
                message: format!("{:#}", e),
            })?;
        info!("Found {} subtitle file(s) in {:?}", inputs.len(), dir);

        Ok(self.translate_batch(&inputs, request, stats, cancel).await)
    }
}

/// Work out where a file's translation goes and check it is safe to write
fn resolve_output(
    input: &Path,
    explicit: Option<&Path>,
    format: FormatKind,
    request: &FileRequest,
) -> Result<PathBuf, ValidationError> {
    let output = match explicit {
        Some(path) if path.as_os_str().is_empty() => return Err(ValidationError::EmptyOutputPath),
        Some(path) => path.to_path_buf(),
        None => default_output(input, format, request),
    };

    if same_file(input, &output) {
        return Err(ValidationError::OutputIsInput(output));
    }
    if output.exists() && !request.force_overwrite {
        return Err(ValidationError::OutputExists(output));
    }

    Ok(output)
}

/// `<stem><suffix>.<ext>` beside the input, or inside `request.output_dir`
fn default_output(input: &Path, format: FormatKind, request: &FileRequest) -> PathBuf {
    let beside = FileManager::output_path_for(input, &request.output_suffix, format.extension());
    match (&request.output_dir, beside.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => beside,
    }
}

/// For each input, the output path it would share with an earlier input.
///
/// Inputs whose format is only known from their content are not checked.
fn duplicate_outputs(inputs: &[PathBuf], request: &FileRequest) -> Vec<Option<PathBuf>> {
    let mut claimed = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let format = request.output_format.or_else(|| formats::detect_format(input, None))?;
            let output = default_output(input, format, request);
            if claimed.insert(output.clone()) { None } else { Some(output) }
        })
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
