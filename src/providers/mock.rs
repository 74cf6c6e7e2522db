/*!
 * Scripted provider used by the pipeline tests.
 *
 * The constructor picks how every call behaves (`working`, `echo`,
 * `fail_first(n)`, `failing`, ...). Clones share one call log, so a test can
 * hand a clone to the service and inspect the original afterwards.
 *
 * `with_mapping` adds exact input -> output pairs that win over the default
 * tagged text whenever the behavior succeeds.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// How each call to a [`MockProvider`] is answered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[TRANSLATED to <tgt>] <text>`
    Working,
    /// Always succeeds with the input text
    Echo,
    /// Every `fail_every`-th call fails with a 503
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then works
    FailFirst(usize),
    /// Every call fails with a 500
    Failing,
    /// Returns an empty response
    Empty,
    /// Sleeps before answering like `Working`
    Slow { delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Shared between clones
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
    mapping: HashMap<String, String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            mapping: HashMap::new(),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst(failures))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Add an exact translation for `text`
    pub fn with_mapping(mut self, text: impl Into<String>, translated: impl Into<String>) -> Self {
        self.mapping.insert(text.into(), translated.into());
        self
    }

    /// Number of translate calls made so far, across clones
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn success(&self, text: &str, target_language: &str) -> String {
        if let Some(mapped) = self.mapping.get(text) {
            return mapped.clone();
        }
        match self.behavior {
            MockBehavior::Echo => text.to_string(),
            _ => format!("[TRANSLATED to {}] {}", target_language, text),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(text.to_string());

        match self.behavior {
            MockBehavior::Working | MockBehavior::Echo => Ok(self.success(text, target_language)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.success(text, target_language))
                }
            }

            MockBehavior::FailFirst(failures) => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.success(text, target_language))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.success(text, target_language))
            }
        }
    }
}
