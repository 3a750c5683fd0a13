//! Specialized education agents.
//!
//! Every variant is a plain struct owning its [`AgentConfig`] and
//! implementing [`AgentBehavior`]. The closed [`Agent`] enum is what the
//! registry stores and what request processing runs against, so dispatch is
//! a `match` rather than a vtable.
//!
//! # Example
//!
//! ```rust,ignore
//! use eduagent_core::agents::{Agent, AgentBehavior, AgentType};
//!
//! let agent = Agent::for_type(AgentType::Assessment);
//! let prompt = agent.build_prompt(&request, None, false);
//! ```

mod analytics;
mod assessment;
mod config;
mod content_creator;
mod doubt_solver;
pub(crate) mod heuristics;
mod mentor;
mod process;
pub mod prompt;
mod study_planner;
mod tutor;

pub use analytics::AnalyticsAgent;
pub use assessment::AssessmentAgent;
pub use config::{AgentConfig, AgentConfigPatch, AgentSummary, AgentType, RateLimitConfig};
pub use content_creator::ContentCreatorAgent;
pub use doubt_solver::DoubtSolverAgent;
pub use heuristics::clamp_confidence;
pub use mentor::MentorAgent;
pub use process::DEGRADED_CONTENT;
pub use study_planner::StudyPlannerAgent;
pub use tutor::TutorAgent;

use serde_json::{Map, Value};

use crate::llm::{Pricing, Provider};
use crate::types::{AIRequest, ConversationContext};

/// Capabilities every agent variant provides.
///
/// Only the identity, config, instructions, confidence and annotation hooks
/// are variant-specific; prompt assembly and pricing have shared defaults.
pub trait AgentBehavior: Send + Sync {
    fn agent_type(&self) -> AgentType;

    fn config(&self) -> &AgentConfig;

    /// Output-shape instructions appended after the request.
    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String;

    /// Build the user prompt sent to the provider.
    fn build_prompt(
        &self,
        request: &AIRequest,
        context: Option<&ConversationContext>,
        structured: bool,
    ) -> String {
        prompt::compose(
            request,
            context,
            &self.output_instructions(request, structured),
        )
    }

    /// Heuristic quality score in [0, 1].
    fn calculate_confidence(&self, content: &str) -> f64;

    /// Per-1000-token rates for a provider.
    fn pricing(&self, provider: Provider) -> Pricing {
        Pricing::default_for(provider)
    }

    /// Cost in USD of a completion served by `provider`.
    fn calculate_cost(&self, provider: Provider, input_tokens: u64, output_tokens: u64) -> f64 {
        self.pricing(provider).cost(input_tokens, output_tokens)
    }

    /// Variant-specific response metadata.
    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value>;
}

/// One of the seven agent variants.
#[derive(Debug, Clone)]
pub enum Agent {
    Tutor(TutorAgent),
    ContentCreator(ContentCreatorAgent),
    Assessment(AssessmentAgent),
    Analytics(AnalyticsAgent),
    Mentor(MentorAgent),
    StudyPlanner(StudyPlannerAgent),
    DoubtSolver(DoubtSolverAgent),
}

macro_rules! dispatch {
    ($self:expr, $agent:ident => $body:expr) => {
        match $self {
            Agent::Tutor($agent) => $body,
            Agent::ContentCreator($agent) => $body,
            Agent::Assessment($agent) => $body,
            Agent::Analytics($agent) => $body,
            Agent::Mentor($agent) => $body,
            Agent::StudyPlanner($agent) => $body,
            Agent::DoubtSolver($agent) => $body,
        }
    };
}

impl Agent {
    /// The variant for `agent_type` with its default configuration.
    pub fn for_type(agent_type: AgentType) -> Self {
        match agent_type {
            AgentType::Tutor => Self::Tutor(TutorAgent::new()),
            AgentType::ContentCreator => Self::ContentCreator(ContentCreatorAgent::new()),
            AgentType::Assessment => Self::Assessment(AssessmentAgent::new()),
            AgentType::Analytics => Self::Analytics(AnalyticsAgent::new()),
            AgentType::Mentor => Self::Mentor(MentorAgent::new()),
            AgentType::StudyPlanner => Self::StudyPlanner(StudyPlannerAgent::new()),
            AgentType::DoubtSolver => Self::DoubtSolver(DoubtSolverAgent::new()),
        }
    }

    /// The variant for `agent_type` with an explicit configuration.
    pub fn with_config(agent_type: AgentType, config: AgentConfig) -> Self {
        match agent_type {
            AgentType::Tutor => Self::Tutor(TutorAgent::with_config(config)),
            AgentType::ContentCreator => {
                Self::ContentCreator(ContentCreatorAgent::with_config(config))
            }
            AgentType::Assessment => Self::Assessment(AssessmentAgent::with_config(config)),
            AgentType::Analytics => Self::Analytics(AnalyticsAgent::with_config(config)),
            AgentType::Mentor => Self::Mentor(MentorAgent::with_config(config)),
            AgentType::StudyPlanner => Self::StudyPlanner(StudyPlannerAgent::with_config(config)),
            AgentType::DoubtSolver => Self::DoubtSolver(DoubtSolverAgent::with_config(config)),
        }
    }

    /// Default configuration of the variant for `agent_type`.
    pub fn default_config(agent_type: AgentType) -> AgentConfig {
        match agent_type {
            AgentType::Tutor => TutorAgent::default_config(),
            AgentType::ContentCreator => ContentCreatorAgent::default_config(),
            AgentType::Assessment => AssessmentAgent::default_config(),
            AgentType::Analytics => AnalyticsAgent::default_config(),
            AgentType::Mentor => MentorAgent::default_config(),
            AgentType::StudyPlanner => StudyPlannerAgent::default_config(),
            AgentType::DoubtSolver => DoubtSolverAgent::default_config(),
        }
    }

    pub fn summary(&self) -> AgentSummary {
        let config = self.config();
        AgentSummary {
            agent_type: self.agent_type(),
            provider: config.provider,
            model: config.model.clone(),
            rate_limiting: config.rate_limiting,
        }
    }
}

impl AgentBehavior for Agent {
    fn agent_type(&self) -> AgentType {
        dispatch!(self, a => a.agent_type())
    }

    fn config(&self) -> &AgentConfig {
        dispatch!(self, a => a.config())
    }

    fn output_instructions(&self, request: &AIRequest, structured: bool) -> String {
        dispatch!(self, a => a.output_instructions(request, structured))
    }

    fn build_prompt(
        &self,
        request: &AIRequest,
        context: Option<&ConversationContext>,
        structured: bool,
    ) -> String {
        dispatch!(self, a => a.build_prompt(request, context, structured))
    }

    fn calculate_confidence(&self, content: &str) -> f64 {
        dispatch!(self, a => a.calculate_confidence(content))
    }

    fn pricing(&self, provider: Provider) -> Pricing {
        dispatch!(self, a => a.pricing(provider))
    }

    fn annotate(&self, request: &AIRequest, content: &str) -> Map<String, Value> {
        dispatch!(self, a => a.annotate(request, content))
    }
}
