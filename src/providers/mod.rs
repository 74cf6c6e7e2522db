/*!
 * Provider implementations for different translation services.
 *
 * A provider is a black box that turns text in one language into text in
 * another. Retries, pacing and caching live in the translation pipeline, so
 * a provider makes exactly one attempt per call.
 *
 * - Ollama: local LLM server
 * - OpenAI: OpenAI API and any OpenAI-compatible server (LM Studio)
 * - Mock: scripted behaviours for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Short engine name recorded alongside cached translations
    fn name(&self) -> &str;

    /// Translate one piece of text
    ///
    /// # Arguments
    /// * `text` - The text to translate, possibly multi-line
    /// * `source_language` - Source language code
    /// * `target_language` - Target language code
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Check that the provider is reachable
    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// System prompt shared by the LLM-backed providers
pub(crate) fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional subtitle translator. Translate the user's text from {} to {}. \
         Keep line breaks where they are. Reply with the translation only, without quotes or notes.",
        describe_language(source_language),
        describe_language(target_language)
    )
}

fn describe_language(code: &str) -> String {
    crate::language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Trim the decorations models like to add around a bare translation
pub(crate) fn clean_completion(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    // Paragraph breaks would split the cue once written out
    unquoted
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Map an HTTP failure status to a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

/// Map a transport failure to a provider error
pub(crate) fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(0)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::{MockBehavior, MockProvider};
pub use ollama::Ollama;
pub use openai::OpenAI;
