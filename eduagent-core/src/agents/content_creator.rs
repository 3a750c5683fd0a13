//! Content creator: lessons, worksheets and other teaching material.

use serde_json::{json, Map, Value};

use super::config::{AgentConfig, AgentType};
use super::heuristics::{count_headings, extract_json, word_count, ConfidenceScore};
use super::prompt::JSON_ONLY;
use super::AgentBehavior;
use crate::llm::Provider;
use crate::types::AIRequest;

const SYSTEM_PROMPT: &str = "You are an instructional designer who writes engaging, \
well-structured educational content aligned to clear learning objectives.";

/// Kinds of material the creator recognises in a request, most specific first.
const CONTENT_KINDS: [(&str, &str); 5] = [
    ("worksheet", "worksheet"),
    ("presentation", "presentation"),
    ("slides", "presentation"),
    ("flashcard", "flashcards"),
    ("lesson", "lesson_plan"),
];

#[derive(Debug, Clone)]
pub struct ContentCreatorAgent {
    config: AgentConfig,
}

impl ContentCreatorAgent {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> AgentConfig {
        AgentConfig::new(Provider::Anthropic, "claude-3-5-sonnet-20241022")
            .with_temperature(0.8)
            .with_max_tokens(4000)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_fallback(Provider::OpenAI)
            .with_fallback_model("gpt-4o")
            .with_rate_limit(20, 300)
    }

    /// Classify what the learner or teacher asked for.
    pub fn content_kind(prompt: &str) -> &'static str {
        let lowered = prompt.to_lowercase();
        CONTENT_KINDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or("general")
    }
}

impl Default for ContentCreatorAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for ContentCreatorAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::ContentCreator
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String {
        let kind = Self::content_kind(&request.prompt).replace('_', " ");
        if structured {
            format!(
                "Produce a {} as JSON with keys \"title\", \"objectives\" (array), \"sections\" \
                 (array of {{\"heading\", \"body\"}}), \"activities\" (array) and \"assessment\" \
                 (array). {}",
                kind, JSON_ONLY
            )
        } else {
            format!(
                "Produce a {} in markdown with the headings: Learning Objectives, Content, \
                 Activities, Assessment.",
                kind
            )
        }
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        let lowered = content.to_lowercase();
        ConfidenceScore::base(0.7)
            .bonus_any(&lowered, &["objective"], 0.1)
            .bonus_any(&lowered, &["activity", "activities", "exercise"], 0.1)
            .bonus_any(&lowered, &["assessment", "quiz"], 0.05)
            .bonus_if(count_headings(content) >= 2, 0.05)
            .finish()
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        let structured = extract_json(content);
        let section_count = structured
            .as_ref()
            .and_then(|v| v.get("sections"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or_else(|| count_headings(content));

        let mut metadata = Map::new();
        metadata.insert(
            "contentType".into(),
            json!(Self::content_kind(&request.prompt)),
        );
        metadata.insert("sectionCount".into(), json!(section_count));
        metadata.insert("wordCount".into(), json!(word_count(content)));
        metadata.insert(
            "format".into(),
            json!(if structured.is_some() { "json" } else { "markdown" }),
        );
        metadata
    }
}
