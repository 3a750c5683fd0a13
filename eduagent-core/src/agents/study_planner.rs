//! Study planner: schedules, milestones and time allocation.

use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

use super::config::{AgentConfig, AgentType};
use super::heuristics::{extract_json, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::Provider;
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are a study planning coach. Build realistic schedules that \
balance new material, practice and review, sized to the learner's available time.";

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(day|week|month)s?\b").expect("Invalid regex")
});

static SESSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:[-*#]+\s*)?(?:day|week)\s*\d+").expect("Invalid regex")
});

static TIME_ALLOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*(?:min(?:ute)?s?|h(?:ou)?rs?)\b").expect("Invalid regex")
});

#[derive(Debug, Clone)]
pub struct StudyPlannerAgent {
    config: AgentConfig,
}

impl StudyPlannerAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::OpenAI, "gpt-4o")
            .with_temperature(0.5)
            .with_max_tokens(3000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::Anthropic)
            .with_rate_limit(20, 200)
    }

    /// Plan length mentioned in the request, e.g. "4 weeks" -> `Some("4 weeks")`.
    pub fn requested_duration(prompt: &str) -> Option<String> {
        DURATION.captures(prompt).map(|c| {
            let amount = &c[1];
            let unit = c[2].to_lowercase();
            if amount == "1" {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", amount, unit)
            }
        })
    }
}

impl Default for StudyPlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for StudyPlannerAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::StudyPlanner
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String {
        let span = Self::requested_duration(&request.prompt)
            .map(|d| format!("Cover {}. ", d))
            .unwrap_or_default();
        if structured {
            format!(
                "{}Return JSON with keys \"goal\" (string), \"schedule\" (array of {{\"day\", \
                 \"topics\", \"durationMinutes\"}}) and \"milestones\" (array of strings). {}",
                span, JSON_ONLY
            )
        } else {
            format!(
                "{}Organize the plan by week and day with time allocations, include regular \
                 review sessions, and mark milestones.",
                span
            )
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.65)
            .bonus_any(&lowered, &["week", "day"], 0.15)
            .bonus_any(&lowered, &["goal", "milestone"], 0.1)
            .bonus_any(&lowered, &["review"], 0.05)
            .bonus_if(TIME_ALLOCATION.is_match(content), 0.05)
            .finish()
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let session_count = extract_json(content)
            .as_ref()
            .and_then(|v| v.get("schedule"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or_else(|| SESSION_LINE.find_iter(content).count());

        let mut metadata = Map::new();
        metadata.insert("sessionCount".into(), json!(session_count));
        metadata.insert(
            "requestedDuration".into(),
            json!(Self::requested_duration(&request.prompt)),
        );
        metadata.insert(
            "hasMilestones".into(),
            json!(content.to_lowercase().contains("milestone")),
        );
        metadata
    }
}
