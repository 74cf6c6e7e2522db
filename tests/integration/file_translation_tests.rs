/*!
 * Integration tests for translating whole subtitle files
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use subtrans::errors::{TranslationError, ValidationError};
use subtrans::file_utils::BACKUP_DIR;
use subtrans::formats::FormatKind;
use subtrans::providers::MockProvider;
use subtrans::translation::{
    BatchTranslator, CancellationFlag, EntryProgress, FileRequest, SessionStats, TranslationCache,
};
use crate::common;

#[tokio::test]
async fn test_translateFile_srtHelloToBonjour_shouldWriteExactOutputAndCache() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "hello.srt", "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n")?;
    let (service, cache) = common::service_with(MockProvider::working().with_mapping("Hello", "Bonjour"));
    let translator = BatchTranslator::new(service);
    let stats = SessionStats::new();

    let output = translator
        .translate_file(&input, None, &common::en_to_fr(), &stats, &CancellationFlag::new())
        .await?;

    assert_eq!(output, temp_dir.path().join("hello_translated.srt"));
    assert_eq!(fs::read_to_string(&output)?, "1\n00:00:01,000 --> 00:00:03,000\nBonjour\n\n");
    assert_eq!(cache.lookup("Hello", "en", "fr").await.as_deref(), Some("Bonjour"));

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.files_processed, 1);
    assert_eq!(snapshot.entries_translated, 1);
    assert_eq!(snapshot.provider_calls, 1);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_secondRun_shouldBeServedFromCache() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let provider = MockProvider::working();
    let (service, _) = common::service_with(provider.clone());
    let translator = BatchTranslator::new(service);
    let stats = SessionStats::new();
    let cancel = CancellationFlag::new();

    translator.translate_file(&input, None, &common::en_to_fr(), &stats, &cancel).await?;
    translator.translate_file(&input, None, &common::en_to_fr(), &stats, &cancel).await?;

    assert_eq!(provider.call_count(), 3);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.cache_hits, 3);
    assert_eq!(snapshot.cache_hit_rate, 50.0);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_assToSrt_shouldConvertTimestamps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "styled.ass", common::SAMPLE_ASS)?;
    let (service, _) = common::service_with(MockProvider::echo());
    let request = FileRequest {
        output_format: Some(FormatKind::Srt),
        ..common::en_to_fr()
    };

    let output = BatchTranslator::new(service)
        .translate_file(&input, None, &request, &SessionStats::new(), &CancellationFlag::new())
        .await?;

    assert_eq!(output, temp_dir.path().join("styled_translated.srt"));
    let content = fs::read_to_string(&output)?;
    assert!(content.starts_with("1\n00:00:01,500 --> 00:00:03,000\nHello there\n"), "{}", content);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withBlankEntry_shouldPassItThrough() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "music.vtt",
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n♪♪\n\n00:00:03.000 --> 00:00:04.000\nHi\n",
    )?;
    let provider = MockProvider::working();
    let (service, _) = common::service_with(provider.clone());
    let stats = SessionStats::new();

    let output = BatchTranslator::new(service)
        .translate_file(&input, None, &common::en_to_fr(), &stats, &CancellationFlag::new())
        .await?;

    assert_eq!(
        fs::read_to_string(output)?,
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\n♪♪\n\n2\n00:00:03.000 --> 00:00:04.000\n[TRANSLATED to fr] Hi\n\n"
    );
    assert_eq!(provider.requests(), vec!["Hi".to_string()]);
    assert_eq!(stats.snapshot().skipped, 1);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withFailingProvider_shouldKeepOriginalText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::failing());
    let stats = SessionStats::new();

    let output = BatchTranslator::new(service)
        .translate_file(&input, None, &common::en_to_fr(), &stats, &CancellationFlag::new())
        .await?;

    assert_eq!(fs::read_to_string(output)?, common::SAMPLE_SRT.to_string() + "\n");
    assert_eq!(stats.snapshot().translation_errors, 3);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withExistingOutput_shouldRefuseWithoutForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    common::create_test_file(temp_dir.path(), "movie_translated.srt", "keep")?;
    let (service, _) = common::service_with(MockProvider::working());
    let request = FileRequest {
        force_overwrite: false,
        ..common::en_to_fr()
    };
    let stats = SessionStats::new();

    let result = BatchTranslator::new(service)
        .translate_file(&input, None, &request, &stats, &CancellationFlag::new())
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Validation(ValidationError::OutputExists(_)))
    ));
    assert_eq!(fs::read_to_string(temp_dir.path().join("movie_translated.srt"))?, "keep");
    assert_eq!(stats.snapshot().files_failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withMissingInput_shouldFailValidation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (service, _) = common::service_with(MockProvider::working());

    let result = BatchTranslator::new(service)
        .translate_file(
            &temp_dir.path().join("nope.srt"),
            None,
            &common::en_to_fr(),
            &SessionStats::new(),
            &CancellationFlag::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Validation(ValidationError::MissingInput(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withBackupEnabled_shouldCopyInputFirst() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::working());
    let request = FileRequest {
        create_backup: true,
        ..common::en_to_fr()
    };

    BatchTranslator::new(service)
        .translate_file(&input, None, &request, &SessionStats::new(), &CancellationFlag::new())
        .await?;

    let backups: Vec<PathBuf> = fs::read_dir(temp_dir.path().join(BACKUP_DIR))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0])?, common::SAMPLE_SRT);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withAutoSource_shouldDetectAndUseDetectedLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "french.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nIl est le chef de la maison et un ami\n\n",
    )?;
    let (service, cache) = common::service_with(MockProvider::working());
    let request = FileRequest {
        source_language: "auto".to_string(),
        target_language: "en".to_string(),
        ..common::en_to_fr()
    };

    BatchTranslator::new(service)
        .translate_file(&input, None, &request, &SessionStats::new(), &CancellationFlag::new())
        .await?;

    assert!(
        cache
            .lookup("Il est le chef de la maison et un ami", "fr", "en")
            .await
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withProgressCallback_shouldReportEveryEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::working());
    let seen: Arc<Mutex<Vec<(PathBuf, usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let translator = BatchTranslator::new(service).with_progress(Arc::new(move |path: &Path, progress: &EntryProgress| {
        sink.lock().push((path.to_path_buf(), progress.position, progress.total));
    }));

    translator
        .translate_file(&input, None, &common::en_to_fr(), &SessionStats::new(), &CancellationFlag::new())
        .await?;

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2], (input.clone(), 3, 3));
    Ok(())
}

#[tokio::test]
async fn test_translateFile_alreadyCancelled_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::working());
    let cancel = CancellationFlag::new();
    cancel.cancel();
    let stats = SessionStats::new();

    let result = BatchTranslator::new(service)
        .translate_file(&input, None, &common::en_to_fr(), &stats, &cancel)
        .await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert!(!temp_dir.path().join("movie_translated.srt").exists());
    assert_eq!(stats.snapshot().files_failed, 0);
    Ok(())
}
