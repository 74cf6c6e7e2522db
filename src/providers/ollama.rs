use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{TranslationProvider, clean_completion, status_error, system_prompt, transport_error};
use crate::errors::ProviderError;

/// Translation back-end talking to a local Ollama server
#[derive(Debug, Clone)]
pub struct Ollama {
    base_url: String,
    model: String,
    client: Client,
    temperature: f32,
}

/// Body of `POST /api/generate`
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Always `false` from this client; a single JSON object is expected back
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    temperature: f32,
}

/// One object (or one JSONL chunk) returned by `/api/generate`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    pub fn system(mut self, instructions: impl Into<String>) -> Self {
        self.system = Some(instructions.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions { temperature });
        self
    }
}

impl GenerationResponse {
    /// Parse a response body that is either one JSON object or JSONL stream chunks
    pub fn from_body(body: &str) -> Result<Self, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(parsed);
        }

        // Streamed chunks: concatenate every `response` piece
        let mut model = String::new();
        let mut response = String::new();
        let mut done = false;
        let mut parsed_any = false;
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let chunk: GenerationResponse = serde_json::from_str(line)
                .map_err(|e| ProviderError::ParseError(format!("{}: {}", e, truncate(line, 200))))?;
            parsed_any = true;
            if model.is_empty() {
                model = chunk.model;
            }
            response.push_str(&chunk.response);
            done |= chunk.done;
        }

        if !parsed_any {
            return Err(ProviderError::ParseError("empty response body".to_string()));
        }
        Ok(Self { model, response, done })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

/// Normalize an endpoint into `scheme://host:port` without a trailing slash
pub(crate) fn normalize_endpoint(endpoint: &str, default_port: u16) -> Result<String, ProviderError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ProviderError::ConnectionError("endpoint cannot be empty".to_string()));
    }

    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };
    let mut url = Url::parse(&with_scheme)
        .map_err(|e| ProviderError::ConnectionError(format!("invalid endpoint {}: {}", endpoint, e)))?;
    if url.port().is_none() && url.scheme() == "http" {
        let _ = url.set_port(Some(default_port));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

impl Ollama {
    pub const DEFAULT_PORT: u16 = 11434;

    /// Create a client for `endpoint` (for example `http://localhost:11434`)
    pub fn new(endpoint: &str, model: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url: normalize_endpoint(endpoint, Self::DEFAULT_PORT)?,
            model: model.into(),
            client,
            temperature: 0.3,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one generation request
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url).json(&request).send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            error!("Ollama API error ({}): {}", status, truncate(&body, 500));
            return Err(status_error(status, body));
        }

        GenerationResponse::from_body(&body)
    }
}

#[async_trait]
impl TranslationProvider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(system_prompt(source_language, target_language))
            .temperature(self.temperature);

        let response = self.generate(request).await?;
        debug!("Ollama answered with {} chars", response.response.len());

        let translated = clean_completion(&response.response);
        if translated.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(translated)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            Err(status_error(status, response.text().await.unwrap_or_default()))
        }
    }
}
