//! Provider gateway types: providers, completion requests and pricing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Google,
}

impl Provider {
    /// All providers, in a stable order.
    pub const ALL: [Provider; 3] = [Provider::OpenAI, Provider::Anthropic, Provider::Google];

    /// Model used when this provider is called without an explicit model,
    /// typically as a fallback.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::Google => "gemini-1.5-flash",
        }
    }

    /// Whether the provider's completion response is consumed with token counts.
    pub fn reports_usage(&self) -> bool {
        !matches!(self, Self::Google)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "google" | "gemini" => Ok(Self::Google),
            other => Err(Error::Config(format!("Unknown provider: {}", other))),
        }
    }
}

/// A single text completion call against one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCompletionRequest {
    /// Model identifier
    pub model: String,
    /// System prompt
    pub system_prompt: String,
    /// Fully built user prompt
    pub user_prompt: String,
    /// Temperature (0.0 - 2.0)
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Ask the provider for JSON output where supported
    pub structured_output: bool,
}

impl TextCompletionRequest {
    pub fn new(model: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: String::new(),
            user_prompt: user_prompt.into(),
            temperature: 0.7,
            max_tokens: 1024,
            structured_output: false,
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_structured_output(mut self, structured: bool) -> Self {
        self.structured_output = structured;
        self
    }
}

/// Provider-neutral completion result.
///
/// Token counts are `None` when the provider did not report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextCompletion {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

impl TextCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }
}

/// Linear per-1000-token pricing in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Pricing {
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }

    /// Flat rate applied to input and output alike.
    pub const fn flat(per_1k: f64) -> Self {
        Self::new(per_1k, per_1k)
    }

    /// Default rates for a provider.
    pub fn default_for(provider: Provider) -> Self {
        match provider {
            Provider::OpenAI => Self::new(0.03, 0.06),
            Provider::Anthropic => Self::new(0.003, 0.015),
            Provider::Google => Self::flat(0.0005),
        }
    }

    /// Calculate cost for given token usage.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let input_cost = (input_tokens as f64 / 1000.0) * self.input_per_1k;
        let output_cost = (output_tokens as f64 / 1000.0) * self.output_per_1k;
        input_cost + output_cost
    }
}

/// Estimate a token count from text length: `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Google);
        assert!("mistral".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_serde_names() {
        let json = serde_json::to_string(&Provider::OpenAI).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: Provider = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(parsed, Provider::Anthropic);
    }

    #[test]
    fn test_pricing_cost() {
        let pricing = Pricing::new(0.03, 0.06);
        // 2k input * 0.03 + 1k output * 0.06
        let cost = pricing.cost(2000, 1000);
        assert!((cost - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_flat_pricing() {
        let pricing = Pricing::default_for(Provider::Google);
        let cost = pricing.cost(1000, 1000);
        assert!((cost - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_request_builder_clamps_temperature() {
        let req = TextCompletionRequest::new("gpt-4o", "hi")
            .with_system("be brief")
            .with_temperature(3.5)
            .with_max_tokens(200)
            .with_structured_output(true);

        assert_eq!(req.temperature, 2.0);
        assert_eq!(req.max_tokens, 200);
        assert_eq!(req.system_prompt, "be brief");
        assert!(req.structured_output);
    }
}
