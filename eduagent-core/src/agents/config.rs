//! Agent identity and per-agent configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;
use crate::llm::Provider;

/// The closed set of agent kinds a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Tutor,
    ContentCreator,
    Assessment,
    Analytics,
    Mentor,
    StudyPlanner,
    DoubtSolver,
}

impl AgentType {
    /// Every agent type, in registration order.
    pub const ALL: [AgentType; 7] = [
        AgentType::Tutor,
        AgentType::ContentCreator,
        AgentType::Assessment,
        AgentType::Analytics,
        AgentType::Mentor,
        AgentType::StudyPlanner,
        AgentType::DoubtSolver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutor => "tutor",
            Self::ContentCreator => "content_creator",
            Self::Assessment => "assessment",
            Self::Analytics => "analytics",
            Self::Mentor => "mentor",
            Self::StudyPlanner => "study_planner",
            Self::DoubtSolver => "doubt_solver",
        }
    }

    /// Parse a tag, returning `None` for anything outside the closed set.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag.trim())
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::agent_not_found(s))
    }
}

/// Request-volume thresholds for one agent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
}

impl RateLimitConfig {
    pub const fn new(requests_per_minute: u32, requests_per_hour: u32) -> Self {
        Self {
            requests_per_minute,
            requests_per_hour,
        }
    }
}

/// Configuration owned by one agent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Primary provider
    pub provider: Provider,
    /// Primary model
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// System prompt sent with every call
    pub system_prompt: String,
    /// Provider tried when the primary call fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_provider: Option<Provider>,
    /// Model for the fallback provider; defaults to that provider's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    /// Admission thresholds; `None` disables rate limiting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting: Option<RateLimitConfig>,
}

impl AgentConfig {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
            system_prompt: String::new(),
            fallback_provider: None,
            fallback_model: None,
            rate_limiting: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_fallback(mut self, provider: Provider) -> Self {
        self.fallback_provider = Some(provider);
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    pub fn with_rate_limit(mut self, requests_per_minute: u32, requests_per_hour: u32) -> Self {
        self.rate_limiting = Some(RateLimitConfig::new(requests_per_minute, requests_per_hour));
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limiting = None;
        self
    }

    /// The fallback target, if any: provider plus the model to use with it.
    pub fn fallback_target(&self) -> Option<(Provider, String)> {
        self.fallback_provider.map(|provider| {
            let model = self
                .fallback_model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string());
            (provider, model)
        })
    }

    /// In-memory sanity check used by health checks.
    pub fn is_well_formed(&self) -> bool {
        !self.model.trim().is_empty()
            && !self.system_prompt.trim().is_empty()
            && self.max_tokens > 0
            && (0.0..=2.0).contains(&self.temperature)
    }
}

/// Partial `AgentConfig` applied on top of a variant's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentConfigPatch {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    pub fallback_provider: Option<Provider>,
    pub fallback_model: Option<String>,
    pub rate_limiting: Option<RateLimitConfig>,
    /// Set to `true` to remove rate limiting entirely.
    #[serde(default)]
    pub disable_rate_limiting: bool,
}

impl AgentConfigPatch {
    /// Apply this patch to a config, returning the patched copy.
    pub fn apply(&self, mut config: AgentConfig) -> AgentConfig {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(system_prompt) = &self.system_prompt {
            config.system_prompt = system_prompt.clone();
        }
        if let Some(fallback) = self.fallback_provider {
            config.fallback_provider = Some(fallback);
        }
        if let Some(model) = &self.fallback_model {
            config.fallback_model = Some(model.clone());
        }
        if let Some(limits) = self.rate_limiting {
            config.rate_limiting = Some(limits);
        }
        if self.disable_rate_limiting {
            config.rate_limiting = None;
        }
        config
    }
}

/// Public view of an agent's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub provider: Provider,
    pub model: String,
    pub rate_limiting: Option<RateLimitConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_agent_type_tags() {
        for agent_type in AgentType::ALL {
            assert_eq!(AgentType::parse(agent_type.as_str()), Some(agent_type));
            let json = serde_json::to_string(&agent_type).unwrap();
            assert_eq!(json, format!("\"{}\"", agent_type.as_str()));
        }
        assert_eq!(AgentType::parse("librarian"), None);
        assert!("librarian".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_fallback_target_defaults_model() {
        let config = AgentConfig::new(Provider::OpenAI, "gpt-4o").with_fallback(Provider::Google);
        assert_eq!(
            config.fallback_target(),
            Some((Provider::Google, "gemini-1.5-flash".to_string()))
        );

        let config = config.with_fallback_model("gemini-1.5-pro");
        assert_eq!(
            config.fallback_target(),
            Some((Provider::Google, "gemini-1.5-pro".to_string()))
        );

        assert_eq!(AgentConfig::new(Provider::OpenAI, "gpt-4o").fallback_target(), None);
    }

    #[test]
    fn test_well_formed() {
        let config = AgentConfig::new(Provider::Anthropic, "claude").with_system_prompt("Teach.");
        assert!(config.is_well_formed());
        assert!(!config.clone().with_max_tokens(0).is_well_formed());
        assert!(!config.clone().with_temperature(5.0).is_well_formed());
        assert!(!AgentConfig::new(Provider::Anthropic, "claude").is_well_formed());
    }

    #[test]
    fn test_patch_apply() {
        let base = AgentConfig::new(Provider::OpenAI, "gpt-4o")
            .with_system_prompt("base")
            .with_rate_limit(10, 100);

        let patch: AgentConfigPatch = serde_json::from_str(
            r#"{"model": "gpt-4o-mini", "fallbackProvider": "anthropic", "rateLimiting": {"requestsPerMinute": 5, "requestsPerHour": 50}}"#,
        )
        .unwrap();
        let patched = patch.apply(base.clone());

        assert_eq!(patched.model, "gpt-4o-mini");
        assert_eq!(patched.fallback_provider, Some(Provider::Anthropic));
        assert_eq!(patched.rate_limiting, Some(RateLimitConfig::new(5, 50)));
        assert_eq!(patched.system_prompt, "base");

        let disable = AgentConfigPatch {
            disable_rate_limiting: true,
            ..Default::default()
        };
        assert_eq!(disable.apply(base).rate_limiting, None);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result = serde_json::from_str::<AgentConfigPatch>(r#"{"modle": "typo"}"#);
        assert!(result.is_err());
    }
}
