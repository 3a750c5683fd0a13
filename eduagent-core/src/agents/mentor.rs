//! Mentor: career guidance, motivation and long-term direction.

use serde_json::{json, Map, Value};

use super::config::{AgentConfig, AgentType};
use super::heuristics::{contains_any, count_list_items, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::Provider;
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are a supportive mentor. Give honest, encouraging guidance \
about learning paths, careers and goals, grounded in concrete next steps.";

const FOCUS_AREAS: [(&str, &[&str]); 4] = [
    ("career", &["career", "job", "profession", "industry"]),
    ("skills", &["skill", "learn", "course"]),
    ("motivation", &["motivat", "stuck", "confiden", "stress"]),
    ("academics", &["college", "university", "degree", "exam"]),
];

#[derive(Debug, Clone)]
pub struct MentorAgent {
    config: AgentConfig,
}

impl MentorAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::Anthropic, "claude-3-5-sonnet-20241022")
            .with_temperature(0.7)
            .with_max_tokens(2000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::Google)
            .with_rate_limit(30, 300)
    }

    /// Topics the request touches on, in a fixed order.
    pub fn focus_areas(prompt: &str) -> Vec<&'static str> {
        let lowered = prompt.to_lowercase();
        FOCUS_AREAS
            .iter()
            .filter(|(_, keywords)| contains_any(&lowered, keywords))
            .map(|(area, _)| *area)
            .collect()
    }
}

impl Default for MentorAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for MentorAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Mentor
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, _request: &AIRequest, structured: bool) -> String {
        if structured {
            format!(
                "Return JSON with keys \"guidance\" (string), \"nextSteps\" (array of strings) and \
                 \"resources\" (array of strings). {}",
                JSON_ONLY
            )
        } else {
            "Offer encouraging guidance, then list three to five concrete next steps and any \
             resources worth exploring."
                .to_string()
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.7)
            .bonus_any(&lowered, &["recommend", "suggest"], 0.1)
            .bonus_any(&lowered, &["goal"], 0.1)
            .bonus_any(&lowered, &["skill", "career"], 0.05)
            .bonus_any(&lowered, &["next step"], 0.05)
            .finish()
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert(
            "focusAreas".into(),
            json!(Self::focus_areas(&request.prompt)),
        );
        metadata.insert("actionItemCount".into(), json!(count_list_items(content)));
        metadata
    }
}
