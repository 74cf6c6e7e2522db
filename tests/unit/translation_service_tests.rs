/*!
 * Tests for the translation service
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use subtrans::clock::RecordingSleeper;
use subtrans::providers::MockProvider;
use subtrans::subtitle_processor::SubtitleEntry;
use subtrans::translation::{
    CancellationFlag, EntryProgress, RequestPacer, SessionStats, TranslationCache, TranslationOptions, TranslationService,
};
use crate::common;

/// Failing twice then succeeding waits base then twice base
#[tokio::test]
async fn test_translateText_withTwoFailures_shouldWaitLinearBackoff() {
    let sleeper = RecordingSleeper::new();
    let provider = MockProvider::fail_first(2);
    let service = TranslationService::new(
        Arc::new(provider.clone()),
        TranslationOptions {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(250),
            ..TranslationOptions::default()
        },
    )
    .with_sleeper(Arc::new(sleeper.clone()));
    let stats = SessionStats::new();

    let translated = service.translate_text("Hello", "en", "fr", &stats).await;

    assert_eq!(translated, "[TRANSLATED to fr] Hello");
    assert_eq!(provider.call_count(), 3);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(250), Duration::from_millis(500)]);
    assert_eq!(stats.snapshot().translation_errors, 0);
}

#[tokio::test]
async fn test_translateText_withExhaustedRetries_shouldReturnOriginalAndNotCache() {
    let provider = MockProvider::failing();
    let (service, cache) = common::service_with(provider.clone());
    let stats = SessionStats::new();

    let translated = service.translate_text("Keep me", "en", "fr", &stats).await;

    assert_eq!(translated, "Keep me");
    assert_eq!(provider.call_count(), 3);
    assert!(cache.is_empty());
    assert_eq!(stats.snapshot().translation_errors, 1);
}

#[tokio::test]
async fn test_translateText_withOrnamentalText_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let (service, _) = common::service_with(provider.clone());
    let stats = SessionStats::new();

    for text in ["", "  ", "--", "...", "♪♪"] {
        assert_eq!(service.translate_text(text, "en", "fr", &stats).await, text);
    }

    assert_eq!(provider.call_count(), 0);
    assert_eq!(stats.snapshot().skipped, 5);
}

#[tokio::test]
async fn test_translateText_withCachedText_shouldUseCacheAndCountHit() {
    let provider = MockProvider::working();
    let (service, cache) = common::service_with(provider.clone());
    cache.store("Hello", "Salut", "en", "fr", "mock").await;
    let stats = SessionStats::new();

    assert_eq!(service.translate_text("Hello", "en", "fr", &stats).await, "Salut");
    assert_eq!(provider.call_count(), 0);
    assert_eq!(cache.usage_count("Hello", "en", "fr"), Some(2));

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.cache_hits, 1);
    assert_eq!(snapshot.cache_hit_rate, 100.0);
}

#[tokio::test]
async fn test_translateEntrySequence_shouldTranslateInOrderAndCountEntries() {
    let provider = MockProvider::working().with_mapping("One", "Un").with_mapping("Two", "Deux");
    let (service, _) = common::service_with(provider.clone());
    let stats = SessionStats::new();
    let mut entries = vec![
        SubtitleEntry::from_millis(1, 0, 1_000, "One"),
        SubtitleEntry::from_millis(2, 1_000, 2_000, "-"),
        SubtitleEntry::from_millis(3, 2_000, 3_000, "Two"),
    ];

    let outcome = service
        .translate_entry_sequence(&mut entries, "en", "fr", &stats, &CancellationFlag::new(), None)
        .await;

    assert_eq!(outcome.completed, 3);
    assert!(!outcome.cancelled);
    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Un", "-", "Deux"]);
    assert_eq!(provider.requests(), vec!["One".to_string(), "Two".to_string()]);
    assert_eq!(entries[2].start.as_millis(), 2_000);
}

#[tokio::test]
async fn test_translateEntrySequence_cancelledFromProgress_shouldStopAfterCurrentEntry() {
    let provider = MockProvider::working();
    let (service, _) = common::service_with(provider.clone());
    let stats = SessionStats::new();
    let cancel = CancellationFlag::new();
    let mut entries: Vec<SubtitleEntry> = (1..=4)
        .map(|i| SubtitleEntry::from_millis(i, 0, 1_000, format!("Line {}", i)))
        .collect();

    let stopper = cancel.clone();
    let on_progress: &(dyn Fn(&EntryProgress) + Send + Sync) = &move |_| stopper.cancel();
    let outcome = service
        .translate_entry_sequence(&mut entries, "en", "fr", &stats, &cancel, Some(on_progress))
        .await;

    assert_eq!(outcome.completed, 1);
    assert!(outcome.cancelled);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(entries[0].text, "[TRANSLATED to fr] Line 1");
    assert_eq!(entries[1].text, "Line 2");
}

#[tokio::test]
async fn test_pacer_shouldSpaceProviderCalls() {
    let provider = MockProvider::working();
    let service = TranslationService::new(Arc::new(provider), common::fast_options())
        .with_pacer(RequestPacer::new(Duration::from_millis(30)));
    let stats = SessionStats::new();

    let started = Instant::now();
    for text in ["a", "b", "c"] {
        service.translate_text(text, "en", "fr", &stats).await;
    }

    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(stats.snapshot().provider_calls, 3);
}
