//! Orchestrator configuration.

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::agents::{AgentConfigPatch, AgentType};
use crate::error::{Error, Result};
use crate::llm::GatewayConfig;

/// Environment variable naming a JSON file of per-agent overrides.
pub const OVERRIDES_ENV: &str = "EDUAGENT_AGENT_OVERRIDES";

/// Everything needed to build an [`crate::AgentManager`].
///
/// Overrides are keyed by agent type tag and patch that variant's defaults:
///
/// ```json
/// {
///   "tutor": { "model": "gpt-4o-mini", "rateLimiting": { "requestsPerMinute": 10, "requestsPerHour": 100 } },
///   "mentor": { "disableRateLimiting": true }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub gateway: GatewayConfig,
    pub agent_overrides: HashMap<AgentType, AgentConfigPatch>,
}

impl OrchestratorConfig {
    pub fn new(gateway: GatewayConfig) -> Self {
        Self {
            gateway,
            agent_overrides: HashMap::new(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Provider credentials come from [`GatewayConfig::from_env`]. If
    /// `EDUAGENT_AGENT_OVERRIDES` is set, the file it names must parse.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(GatewayConfig::from_env());
        if let Ok(path) = std::env::var(OVERRIDES_ENV) {
            if !path.trim().is_empty() {
                config.agent_overrides = load_overrides(Path::new(path.trim()))?;
            }
        }
        Ok(config)
    }

    pub fn with_override(mut self, agent_type: AgentType, patch: AgentConfigPatch) -> Self {
        self.agent_overrides.insert(agent_type, patch);
        self
    }

    pub fn with_overrides(mut self, overrides: HashMap<AgentType, AgentConfigPatch>) -> Self {
        self.agent_overrides.extend(overrides);
        self
    }
}

/// Parse an overrides document.
pub fn overrides_from_json(json: &str) -> Result<HashMap<AgentType, AgentConfigPatch>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse an overrides file.
pub fn load_overrides(path: &Path) -> Result<HashMap<AgentType, AgentConfigPatch>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read agent overrides {}: {}",
            path.display(),
            e
        ))
    })?;
    let overrides = overrides_from_json(&contents)?;
    info!(path = %path.display(), agents = overrides.len(), "Loaded agent overrides");
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::RateLimitConfig;
    use crate::llm::Provider;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "tutor": { "model": "gpt-4o-mini", "rateLimiting": { "requestsPerMinute": 10, "requestsPerHour": 100 } },
        "analytics": { "provider": "openai", "fallbackProvider": "anthropic" },
        "mentor": { "disableRateLimiting": true }
    }"#;

    #[test]
    fn test_parse_overrides() {
        let overrides = overrides_from_json(DOCUMENT).unwrap();
        assert_eq!(overrides.len(), 3);
        assert_eq!(
            overrides[&AgentType::Tutor],
            AgentConfigPatch {
                model: Some("gpt-4o-mini".into()),
                rate_limiting: Some(RateLimitConfig::new(10, 100)),
                ..Default::default()
            }
        );
        assert_eq!(overrides[&AgentType::Analytics].provider, Some(Provider::OpenAI));
        assert!(overrides[&AgentType::Mentor].disable_rate_limiting);
    }

    #[test]
    fn test_bad_documents_are_rejected() {
        assert!(matches!(
            overrides_from_json(r#"{"wizard": {}}"#),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            overrides_from_json(r#"{"tutor": {"colour": "red"}}"#),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_load_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let overrides = load_overrides(file.path()).unwrap();
        assert_eq!(overrides.len(), 3);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_overrides(Path::new("/nonexistent/overrides.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::default().with_override(
            AgentType::Tutor,
            AgentConfigPatch {
                temperature: Some(0.2),
                ..Default::default()
            },
        );
        assert_eq!(config.agent_overrides.len(), 1);
        assert!(config.gateway.configured_providers().is_empty());
    }
}
