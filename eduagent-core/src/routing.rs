//! Intent routing.
//!
//! A request goes to the agent named by its explicit override when that
//! parses to a known [`AgentType`]. Otherwise the lower-cased prompt is run
//! through [`ROUTING_RULES`] in order, first match wins, and anything
//! unmatched goes to the tutor.

use serde::Serialize;

use crate::agents::AgentType;
use crate::types::AIRequest;

/// One keyword rule: every `required` keyword and at least one `any_of`
/// keyword must appear. An empty list imposes no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingRule {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub target: AgentType,
}

impl RoutingRule {
    /// Whether the rule fires for an already lower-cased prompt.
    pub fn matches(&self, lowered: &str) -> bool {
        self.required.iter().all(|k| lowered.contains(k))
            && (self.any_of.is_empty() || self.any_of.iter().any(|k| lowered.contains(k)))
    }
}

/// The keyword cascade, in evaluation order.
///
/// Matching is substring-based, so "test" also fires on "contest".
pub const ROUTING_RULES: [RoutingRule; 6] = [
    RoutingRule {
        name: "content_creation",
        required: &["create"],
        any_of: &["lesson", "content"],
        target: AgentType::ContentCreator,
    },
    RoutingRule {
        name: "assessment",
        required: &[],
        any_of: &["quiz", "test", "assessment"],
        target: AgentType::Assessment,
    },
    RoutingRule {
        name: "study_planning",
        required: &["plan"],
        any_of: &["study", "schedule"],
        target: AgentType::StudyPlanner,
    },
    RoutingRule {
        name: "mentoring",
        required: &[],
        any_of: &["career", "guidance", "future"],
        target: AgentType::Mentor,
    },
    RoutingRule {
        name: "doubt_solving",
        required: &[],
        any_of: &["doubt", "help", "solve"],
        target: AgentType::DoubtSolver,
    },
    RoutingRule {
        name: "analytics",
        required: &[],
        any_of: &["analytics", "progress", "performance"],
        target: AgentType::Analytics,
    },
];

/// Agent used when nothing else matches.
pub const DEFAULT_AGENT: AgentType = AgentType::Tutor;

/// Why a request was routed where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum RoutingReason {
    /// `context.agentType` named a known agent
    Override,
    /// A keyword rule fired
    Rule(&'static str),
    /// Nothing matched
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub agent_type: AgentType,
    pub reason: RoutingReason,
}

/// Route a request, reporting which step decided.
pub fn route(request: &AIRequest) -> RoutingDecision {
    if let Some(agent_type) = request.context.as_ref().and_then(|c| c.agent_override()) {
        return RoutingDecision {
            agent_type,
            reason: RoutingReason::Override,
        };
    }

    let lowered = request.prompt.to_lowercase();
    ROUTING_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| RoutingDecision {
            agent_type: rule.target,
            reason: RoutingReason::Rule(rule.name),
        })
        .unwrap_or(RoutingDecision {
            agent_type: DEFAULT_AGENT,
            reason: RoutingReason::Default,
        })
}

/// The agent type a request should be handled by.
pub fn determine_agent_type(request: &AIRequest) -> AgentType {
    route(request).agent_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn routed(prompt: &str) -> AgentType {
        determine_agent_type(&AIRequest::new("u1", prompt))
    }

    #[test]
    fn test_keyword_examples() {
        assert_eq!(routed("Please create a lesson on fractions"), AgentType::ContentCreator);
        assert_eq!(routed("I need a quiz on photosynthesis"), AgentType::Assessment);
        assert_eq!(routed("Help me plan my study schedule"), AgentType::StudyPlanner);
        assert_eq!(routed("What is gravity?"), AgentType::Tutor);
        assert_eq!(routed("Can you create a lesson on fractions?"), AgentType::ContentCreator);
        assert_eq!(routed("help me solve this"), AgentType::DoubtSolver);
        assert_eq!(routed("tell me about gravity"), AgentType::Tutor);
    }

    #[test]
    fn test_single_keyword_triggers() {
        assert_eq!(routed("I need help with algebra"), AgentType::DoubtSolver);
        assert_eq!(routed("how do I solve quadratics"), AgentType::DoubtSolver);
        assert_eq!(routed("I want guidance on majors"), AgentType::Mentor);
        assert_eq!(routed("my performance this term"), AgentType::Analytics);
        assert_eq!(routed("show analytics for me"), AgentType::Analytics);
    }

    #[test]
    fn test_each_rule_target() {
        assert_eq!(routed("Create new content for week 2"), AgentType::ContentCreator);
        assert_eq!(routed("Run an ASSESSMENT"), AgentType::Assessment);
        assert_eq!(routed("What career fits me?"), AgentType::Mentor);
        assert_eq!(routed("I have a doubt about limits"), AgentType::DoubtSolver);
        assert_eq!(routed("Show my progress"), AgentType::Analytics);
    }

    #[test]
    fn test_rule_order_matters() {
        // Matches both assessment and study planning; assessment is earlier.
        assert_eq!(routed("plan a study schedule before the test"), AgentType::Assessment);
        // "create" without lesson/content falls through to later rules.
        assert_eq!(routed("create a quiz"), AgentType::Assessment);
        // "plan" alone does not trigger study planning.
        assert_eq!(routed("plan my future"), AgentType::Mentor);
    }

    #[test]
    fn test_substring_matching() {
        assert_eq!(routed("who won the contest"), AgentType::Assessment);
    }

    #[test]
    fn test_override_wins() {
        let request = AIRequest::new("u1", "Please create a lesson").with_agent_type(AgentType::Mentor);
        assert_eq!(
            route(&request),
            RoutingDecision {
                agent_type: AgentType::Mentor,
                reason: RoutingReason::Override,
            }
        );
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let request = AIRequest::new("u1", "I need a quiz").with_agent_override("wizard");
        assert_eq!(
            route(&request),
            RoutingDecision {
                agent_type: AgentType::Assessment,
                reason: RoutingReason::Rule("assessment"),
            }
        );
    }

    #[test]
    fn test_default_reason() {
        assert_eq!(
            route(&AIRequest::new("u1", "hello")).reason,
            RoutingReason::Default
        );
    }

    #[test]
    fn test_every_rule_is_reachable() {
        for rule in ROUTING_RULES {
            let prompt = rule
                .required
                .iter()
                .chain(rule.any_of.first())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            let decision = route(&AIRequest::new("u1", prompt));
            assert_eq!(decision.reason, RoutingReason::Rule(rule.name));
        }
    }
}
