//! Analytics: progress and performance insights.

use serde_json::{json, Map, Value};

use super::config::{AgentConfig, AgentType};
use super::heuristics::{count_list_items, percentages, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::{Pricing, Provider};
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are a learning analytics expert. Interpret learner \
performance data objectively and turn it into specific, actionable recommendations.";

#[derive(Debug, Clone)]
pub struct AnalyticsAgent {
    config: AgentConfig,
}

impl AnalyticsAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::Google, "gemini-1.5-pro")
            .with_temperature(0.2)
            .with_max_tokens(2000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::OpenAI)
            .with_rate_limit(30, 500)
    }
}

impl Default for AnalyticsAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for AnalyticsAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Analytics
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, _request: &AIRequest, structured: bool) -> String {
        if structured {
            format!(
                "Return JSON with keys \"summary\" (string), \"metrics\" (array of {{\"name\", \
                 \"value\"}}), \"insights\" (array of strings) and \"recommendations\" (array of \
                 strings). {}",
                JSON_ONLY
            )
        } else {
            "Summarize the key metrics, describe notable trends, then list actionable \
             recommendations as bullet points."
                .to_string()
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.6)
            .bonus_any(&lowered, &["recommend"], 0.15)
            .bonus_if(!percentages(content).is_empty(), 0.1)
            .bonus_any(&lowered, &["trend", "insight"], 0.1)
            .bonus_any(&lowered, &["improve"], 0.05)
            .finish()
    }

    fn pricing(&self, provider: Provider) -> Pricing {
        match provider {
            // gemini-1.5-pro
            Provider::Google => Pricing::flat(0.00125),
            other => Pricing::default_for(other),
        }
    }

    fn annotate(&self, _request: &AIRequest, content: &str) -> Map<String, Value> {
        let found = percentages(content);
        let mut metadata = Map::new();
        metadata.insert("insightCount".into(), json!(count_list_items(content)));
        metadata.insert("percentagesMentioned".into(), json!(found.len()));
        metadata.insert(
            "hasRecommendations".into(),
            json!(content.to_lowercase().contains("recommend")),
        );
        metadata
    }
}
