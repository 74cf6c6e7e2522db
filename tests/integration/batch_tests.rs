/*!
 * Integration tests for multi-file and directory batches
 */

use anyhow::Result;
use std::fs;

use subtrans::errors::{FormatError, TranslationError, ValidationError};
use subtrans::formats::FormatKind;
use subtrans::providers::MockProvider;
use subtrans::translation::{BatchTranslator, CancellationFlag, FileRequest, SessionStats};
use crate::common;

#[tokio::test]
async fn test_translateBatch_withEmptyMiddleFile_shouldReportFailureInOrder() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let inputs = vec![
        common::create_test_subtitle(dir, "first.srt")?,
        common::create_test_file(dir, "second.srt", "")?,
        common::create_test_subtitle(dir, "third.srt")?,
    ];
    let (service, _) = common::service_with(MockProvider::working());
    let stats = SessionStats::new();
    let request = FileRequest {
        concurrency: 3,
        ..common::en_to_fr()
    };

    let report = BatchTranslator::new(service)
        .translate_batch(&inputs, &request, &stats, &CancellationFlag::new())
        .await;

    assert_eq!(
        report.outputs,
        vec![dir.join("first_translated.srt"), dir.join("third_translated.srt")]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, inputs[1]);
    assert!(matches!(
        report.failures[0].1,
        TranslationError::Format {
            source: FormatError::NoEntries,
            ..
        }
    ));
    assert!(!report.cancelled);
    assert!(!report.is_success());

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.files_processed, 2);
    assert_eq!(snapshot.files_failed, 1);
    assert_eq!(snapshot.entries_translated, 6);
    Ok(())
}

#[tokio::test]
async fn test_translateDirectory_shouldTranslateEverySupportedFileOnce() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_subtitle(dir, "a.srt")?;
    common::create_test_file(dir, "b.vtt", common::SAMPLE_VTT)?;
    common::create_test_file(dir, "extras/c.ass", common::SAMPLE_ASS)?;
    common::create_test_file(dir, "readme.txt", "not a subtitle")?;
    let (service, _) = common::service_with(MockProvider::working());
    let translator = BatchTranslator::new(service);
    let stats = SessionStats::new();
    let cancel = CancellationFlag::new();

    let report = translator
        .translate_directory(dir, &common::en_to_fr(), &stats, &cancel)
        .await?;

    assert!(report.is_success());
    assert_eq!(
        report.outputs,
        vec![
            dir.join("a_translated.srt"),
            dir.join("b_translated.vtt"),
            dir.join("extras").join("c_translated.ass"),
        ]
    );

    // Earlier outputs are not picked up again
    let rerun = translator
        .translate_directory(dir, &common::en_to_fr(), &stats, &cancel)
        .await?;
    assert_eq!(rerun.outputs.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_translateDirectory_withOutputDir_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("in");
    let target = temp_dir.path().join("out");
    common::create_test_subtitle(&source, "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::working());
    let request = FileRequest {
        output_dir: Some(target.clone()),
        ..common::en_to_fr()
    };

    let report = BatchTranslator::new(service)
        .translate_directory(&source, &request, &SessionStats::new(), &CancellationFlag::new())
        .await?;

    assert_eq!(report.outputs, vec![target.join("movie_translated.srt")]);
    assert!(fs::read_to_string(&report.outputs[0])?.contains("[TRANSLATED to fr] For testing purposes."));
    Ok(())
}

#[tokio::test]
async fn test_translateDirectory_withFile_shouldFailValidation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let (service, _) = common::service_with(MockProvider::working());

    let result = BatchTranslator::new(service)
        .translate_directory(&file, &common::en_to_fr(), &SessionStats::new(), &CancellationFlag::new())
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Validation(ValidationError::NotADirectory(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn test_translateBatch_whenCancelled_shouldMarkReportAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let inputs = vec![
        common::create_test_subtitle(dir, "one.srt")?,
        common::create_test_subtitle(dir, "two.srt")?,
    ];
    let (service, _) = common::service_with(MockProvider::working());
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let report = BatchTranslator::new(service)
        .translate_batch(&inputs, &common::en_to_fr(), &SessionStats::new(), &cancel)
        .await;

    assert!(report.cancelled);
    assert!(report.outputs.is_empty());
    assert!(report.failures.is_empty());
    assert!(!dir.join("one_translated.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_translateBatch_withCollidingOutputs_shouldFailLaterFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let inputs = vec![
        common::create_test_subtitle(dir, "movie.srt")?,
        common::create_test_file(dir, "movie.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nFrom vtt\n")?,
    ];
    let (service, _) = common::service_with(MockProvider::working());
    let stats = SessionStats::new();
    let request = FileRequest {
        output_format: Some(FormatKind::Srt),
        concurrency: 2,
        ..common::en_to_fr()
    };

    let report = BatchTranslator::new(service)
        .translate_batch(&inputs, &request, &stats, &CancellationFlag::new())
        .await;

    let output = dir.join("movie_translated.srt");
    assert_eq!(report.outputs, vec![output.clone()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, inputs[1]);
    assert!(matches!(
        &report.failures[0].1,
        TranslationError::Validation(ValidationError::DuplicateOutput(path)) if *path == output
    ));
    let written = fs::read_to_string(&output)?;
    assert!(written.contains("[TRANSLATED to fr] This is a test subtitle."));
    assert!(!written.contains("From vtt"));
    assert_eq!(stats.snapshot().files_failed, 1);
    Ok(())
}
