//! Assessment: quizzes, tests and grading rubrics.

use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

use super::config::{AgentConfig, AgentType};
use super::heuristics::{count_steps, extract_json, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::{Pricing, Provider};
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are an assessment specialist. Write fair, unambiguous \
questions at the right difficulty, with answer keys and clear grading criteria.";

const DEFAULT_QUESTION_COUNT: usize = 5;
const MAX_QUESTION_COUNT: usize = 50;

static QUESTION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s+(?:\w+\s+)?questions?\b").expect("Invalid regex"));

#[derive(Debug, Clone)]
pub struct AssessmentAgent {
    config: AgentConfig,
}

impl AssessmentAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::OpenAI, "gpt-4o")
            .with_temperature(0.3)
            .with_max_tokens(3000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::Anthropic)
            .with_rate_limit(30, 300)
    }

    /// Number of questions asked for ("10 questions", "3 multiple choice questions").
    pub fn requested_question_count(prompt: &str) -> usize {
        QUESTION_COUNT
            .captures(prompt)
            .and_then(|c| c[1].parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(|n| n.min(MAX_QUESTION_COUNT))
            .unwrap_or(DEFAULT_QUESTION_COUNT)
    }
}

impl Default for AssessmentAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for AssessmentAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Assessment
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String {
        let count = Self::requested_question_count(&request.prompt);
        if structured {
            format!(
                "Generate exactly {} questions. Return JSON with keys \"questions\" (array of \
                 {{\"question\", \"type\", \"options\", \"answer\", \"explanation\", \"points\"}}) \
                 and \"rubric\" (string). {}",
                count, JSON_ONLY
            )
        } else {
            format!(
                "Generate exactly {} numbered questions. Give options for multiple-choice \
                 questions, then an answer key with brief explanations and a grading rubric.",
                count
            )
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        let has_questions = extract_json(content)
            .as_ref()
            .and_then(|v| v.get("questions"))
            .and_then(Value::as_array)
            .is_some_and(|q| !q.is_empty());

        ConfidenceScore::base(0.65)
            .bonus_if(has_questions, 0.2)
            .bonus_any(&lowered, &["rubric"], 0.1)
            .bonus_any(&lowered, &["answer"], 0.05)
            .bonus_any(&lowered, &["explanation"], 0.05)
            .finish()
    }

    fn pricing(&self, provider: Provider) -> Pricing {
        match provider {
            // gpt-4o rates
            Provider::OpenAI => Pricing::new(0.005, 0.015),
            other => Pricing::default_for(other),
        }
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let lowered = content.to_lowercase();
        let parsed = extract_json(content);
        let question_count = parsed
            .as_ref()
            .and_then(|v| v.get("questions"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or_else(|| count_steps(content));

        let mut metadata = Map::new();
        metadata.insert(
            "requestedQuestions".into(),
            json!(Self::requested_question_count(&request.prompt)),
        );
        metadata.insert("questionCount".into(), json!(question_count));
        metadata.insert("structured".into(), json!(parsed.is_some()));
        metadata.insert("hasAnswerKey".into(), json!(lowered.contains("answer")));
        metadata.insert("hasRubric".into(), json!(lowered.contains("rubric")));
        if let Some(subject) = request.subject() {
            metadata.insert("subject".into(), json!(subject));
        }
        metadata
    }
}
