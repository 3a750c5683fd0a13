//! Doubt solver: works a specific problem through to an answer.

use serde_json::{json, Map, Value};

use super::config::{AgentConfig, AgentType};
use super::heuristics::{count_steps, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::{Pricing, Provider};
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You resolve student doubts. Identify exactly what is confusing, \
solve the problem step by step, and state the final answer clearly.";

#[derive(Debug, Clone)]
pub struct DoubtSolverAgent {
    config: AgentConfig,
}

impl DoubtSolverAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::OpenAI, "gpt-4o-mini")
            .with_temperature(0.3)
            .with_max_tokens(1500)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::Google)
            .with_rate_limit(60, 1000)
    }
}

impl Default for DoubtSolverAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for DoubtSolverAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::DoubtSolver
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, _request: &AIRequest, structured: bool) -> String {
        if structured {
            format!(
                "Return JSON with keys \"doubt\" (string), \"steps\" (array of strings), \
                 \"answer\" (string) and \"commonMistakes\" (array of strings). {}",
                JSON_ONLY
            )
        } else {
            "Restate the doubt in one sentence, solve it step by step, give the final result on \
             a line starting with \"Answer:\", and note one common mistake."
                .to_string()
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.7)
            .bonus_any(&lowered, &["step"], 0.15)
            .bonus_any(&lowered, &["answer", "therefore"], 0.1)
            .bonus_any(&lowered, &["example"], 0.05)
            .finish()
    }

    fn pricing(&self, provider: Provider) -> Pricing {
        match provider {
            // gpt-4o-mini
            Provider::OpenAI => Pricing::new(0.00015, 0.0006),
            other => Pricing::default_for(other),
        }
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let has_final_answer = content
            .lines()
            .any(|line| line.trim_start().to_lowercase().starts_with("answer"));

        let mut metadata = Map::new();
        metadata.insert("stepCount".into(), json!(count_steps(content)));
        metadata.insert("hasFinalAnswer".into(), json!(has_final_answer));
        if let Some(subject) = request.subject() {
            metadata.insert("subject".into(), json!(subject));
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestMetadata;

    #[test]
    fn test_confidence() {
        let agent = DoubtSolverAgent::new();
        let worked = "Step 1: isolate x.\nStep 2: divide.\nAnswer: x = 3";
        assert!((agent.calculate_confidence(worked) - 0.95).abs() < 1e-9);
        assert!((agent.calculate_confidence("Not sure.") - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_mini_pricing() {
        let agent = DoubtSolverAgent::new();
        let cost = agent.calculate_cost(Provider::OpenAI, 10_000, 1000);
        assert!((cost - 0.0021).abs() < 1e-9);
    }

    #[test]
    fn test_annotations() {
        let agent = DoubtSolverAgent::new();
        let request = AIRequest::new("u1", "help me solve 2x = 6")
            .with_metadata(RequestMetadata::new().with_subject("algebra"));
        let metadata = agent.annotate(&request, "1. Divide by 2\n  Answer: 3");

        assert_eq!(metadata["stepCount"], 1);
        assert_eq!(metadata["hasFinalAnswer"], true);
        assert_eq!(metadata["subject"], "algebra");
    }
}
