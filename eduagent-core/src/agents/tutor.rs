//! Tutor: explains concepts step by step with examples.

use serde_json::{json, Map, Value};

use super::config::{AgentConfig, AgentType};
use super::heuristics::{count_steps, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::Provider;
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are a patient, encouraging tutor. Explain concepts clearly, \
build on what the learner already knows, and check understanding as you go.";

/// General-purpose explanatory tutor. The default route.
#[derive(Debug, Clone)]
pub struct TutorAgent {
    config: AgentConfig,
}

impl TutorAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::OpenAI, "gpt-4o")
            .with_temperature(0.7)
            .with_max_tokens(2000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::Anthropic)
            .with_rate_limit(60, 1000)
    }
}

impl Default for TutorAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for TutorAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Tutor
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String {
        let mut instructions = if structured {
            format!(
                "Return JSON with keys \"explanation\" (string), \"examples\" (array of strings), \
                 \"keyPoints\" (array of strings) and \"checkForUnderstanding\" (string). {}",
                JSON_ONLY
            )
        } else {
            "Explain step by step, include at least one concrete example, and finish with a short \
             question that checks understanding."
                .to_string()
        };

        if request
            .level()
            .is_some_and(|l| l.eq_ignore_ascii_case("beginner"))
        {
            instructions.push_str(" Use simple vocabulary and avoid jargon.");
        }
        instructions
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.7)
            .bonus_any(&lowered, &["step"], 0.1)
            .bonus_any(&lowered, &["example", "for instance"], 0.1)
            .bonus_if(content.contains('?'), 0.05)
            .bonus_if(content.len() > 300, 0.05)
            .finish()
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let lowered = content.to_lowercase();
        let mut metadata = Map::new();
        metadata.insert("subject".into(), json!(request.subject()));
        metadata.insert("level".into(), json!(request.level()));
        metadata.insert("stepCount".into(), json!(count_steps(content)));
        metadata.insert(
            "hasExamples".into(),
            json!(lowered.contains("example") || lowered.contains("for instance")),
        );
        metadata.insert("hasCheckQuestion".into(), json!(content.contains('?')));
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestMetadata;

    #[test]
    fn test_default_config() {
        let agent = TutorAgent::new();
        assert_eq!(agent.config().provider, Provider::OpenAI);
        assert_eq!(agent.config().fallback_provider, Some(Provider::Anthropic));
        assert!(agent.config().is_well_formed());
    }

    #[test]
    fn test_confidence_signals() {
        let agent = TutorAgent::new();
        assert!((agent.calculate_confidence("Gravity pulls things down.") - 0.7).abs() < 1e-9);

        let rich = "Step 1: drop a ball. For example, an apple falls. Does that make sense?";
        assert!((agent.calculate_confidence(rich) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_beginner_instructions() {
        let agent = TutorAgent::new();
        let request = AIRequest::new("u1", "What is gravity?")
            .with_metadata(RequestMetadata::new().with_level("Beginner"));
        let prose = agent.output_instructions(&request, false);
        assert!(prose.contains("simple vocabulary"));

        let structured = agent.output_instructions(&request, true);
        assert!(structured.contains("\"keyPoints\""));
        assert!(structured.contains(JSON_ONLY));
    }

    #[test]
    fn test_annotations() {
        let agent = TutorAgent::new();
        let request = AIRequest::new("u1", "x")
            .with_metadata(RequestMetadata::new().with_subject("physics"));
        let metadata = agent.annotate(&request, "1. First\n2. Second\nFor example, a rock.");

        assert_eq!(metadata["subject"], "physics");
        assert_eq!(metadata["level"], Value::Null);
        assert_eq!(metadata["stepCount"], 2);
        assert_eq!(metadata["hasExamples"], true);
        assert_eq!(metadata["hasCheckQuestion"], false);
    }
}
