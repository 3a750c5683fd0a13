//! LLM client trait and provider implementations.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{Provider, TextCompletion, TextCompletionRequest};

/// LLM client trait: one text completion operation plus a health probe.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate text from a prompt.
    async fn complete(&self, request: TextCompletionRequest) -> Result<TextCompletion>;

    /// Lightweight reachability/auth check against the provider.
    async fn health_probe(&self) -> bool;

    /// Get the provider for this client.
    fn provider(&self) -> Provider;
}

/// Configuration for LLM clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key
    pub api_key: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout_secs: 60,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Send a JSON POST and return the body, mapping non-2xx statuses through
/// the provider's error envelope when it parses.
async fn post_json<B, E>(
    provider: Provider,
    request: reqwest::RequestBuilder,
    body: &B,
    extract_error: impl Fn(E) -> String,
) -> Result<String>
where
    B: Serialize + ?Sized,
    E: for<'de> Deserialize<'de>,
{
    let response = request
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| Error::provider(provider, format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::provider(provider, format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        if let Ok(error) = serde_json::from_str::<E>(&text) {
            return Err(Error::provider(
                provider,
                format!("API error ({}): {}", status, extract_error(error)),
            ));
        }
        return Err(Error::provider(
            provider,
            format!("API error ({}): {}", status, text),
        ));
    }

    Ok(text)
}

async fn probe(provider: Provider, request: reqwest::RequestBuilder) -> bool {
    match request.send().await {
        Ok(response) => {
            let ok = response.status().is_success();
            debug!(%provider, status = %response.status(), "Health probe finished");
            ok
        }
        Err(e) => {
            debug!(%provider, error = %e, "Health probe failed");
            false
        }
    }
}

// =============================================================================
// OpenAI
// =============================================================================

/// OpenAI chat completions client.
pub struct OpenAIClient {
    config: ClientConfig,
    http: Client,
}

impl OpenAIClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        trim_base(
            self.config
                .base_url
                .as_deref()
                .unwrap_or(Self::DEFAULT_BASE_URL),
        )
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat>,
}

#[derive(Debug, Serialize)]
struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, request: TextCompletionRequest) -> Result<TextCompletion> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(request.system_prompt),
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: Some(request.user_prompt),
        });

        let api_request = OpenAIRequest {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.structured_output.then_some(OpenAIResponseFormat {
                format_type: "json_object",
            }),
        };

        let url = format!("{}/v1/chat/completions", self.base_url());
        let builder = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key));

        let body = post_json(Provider::OpenAI, builder, &api_request, |e: OpenAIError| {
            e.error.message
        })
        .await?;

        let api_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            Error::provider(Provider::OpenAI, format!("Failed to parse response: {}", e))
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider(Provider::OpenAI, "No choices in response"))?;

        let mut completion = TextCompletion::new(choice.message.content.unwrap_or_default());
        if let Some(usage) = api_response.usage {
            completion = completion.with_usage(usage.prompt_tokens, usage.completion_tokens);
        }
        Ok(completion)
    }

    async fn health_probe(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url());
        let request = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key));
        probe(Provider::OpenAI, request).await
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}

// =============================================================================
// Anthropic
// =============================================================================

/// Anthropic Claude messages client.
pub struct AnthropicClient {
    config: ClientConfig,
    http: Client,
}

impl AnthropicClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        trim_base(
            self.config
                .base_url
                .as_deref()
                .unwrap_or(Self::DEFAULT_BASE_URL),
        )
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn complete(&self, request: TextCompletionRequest) -> Result<TextCompletion> {
        // No native JSON mode; the prompt suffix carries the format instructions.
        let api_request = AnthropicRequest {
            model: request.model,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.user_prompt,
            }],
            max_tokens: request.max_tokens,
            system: (!request.system_prompt.is_empty()).then_some(request.system_prompt),
            // Anthropic caps temperature at 1.0
            temperature: request.temperature.min(1.0),
        };

        let url = format!("{}/v1/messages", self.base_url());
        let builder = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", Self::API_VERSION);

        let body = post_json(
            Provider::Anthropic,
            builder,
            &api_request,
            |e: AnthropicError| format!("{}: {}", e.error.error_type, e.error.message),
        )
        .await?;

        let api_response: AnthropicResponse = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                Provider::Anthropic,
                format!("Failed to parse response: {}", e),
            )
        })?;

        let text = api_response
            .content
            .iter()
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        Ok(TextCompletion::new(text).with_usage(
            api_response.usage.input_tokens,
            api_response.usage.output_tokens,
        ))
    }

    async fn health_probe(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url());
        let request = self
            .http
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", Self::API_VERSION);
        probe(Provider::Anthropic, request).await
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }
}

// =============================================================================
// Google Gemini
// =============================================================================

/// Google Gemini `generateContent` client.
///
/// Token usage is not consumed from Gemini responses; callers estimate it.
pub struct GoogleClient {
    config: ClientConfig,
    http: Client,
}

impl GoogleClient {
    const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        trim_base(
            self.config
                .base_url
                .as_deref()
                .unwrap_or(Self::DEFAULT_BASE_URL),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl LLMClient for GoogleClient {
    async fn complete(&self, request: TextCompletionRequest) -> Result<TextCompletion> {
        let system_instruction = (!request.system_prompt.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: request.system_prompt.clone(),
            }],
        });

        let api_request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user_prompt,
                }],
            }],
            system_instruction,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                response_mime_type: request.structured_output.then_some("application/json"),
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url(),
            request.model
        );
        let builder = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key);

        let body = post_json(Provider::Google, builder, &api_request, |e: GeminiError| {
            e.error.message
        })
        .await?;

        let api_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::provider(Provider::Google, format!("Failed to parse response: {}", e))
        })?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider(Provider::Google, "No candidates in response"))?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(TextCompletion::new(text))
    }

    async fn health_probe(&self) -> bool {
        let url = format!("{}/v1beta/models", self.base_url());
        let request = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key);
        probe(Provider::Google, request).await
    }

    fn provider(&self) -> Provider {
        Provider::Google
    }
}
