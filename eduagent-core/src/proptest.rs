//! Property-based tests for routing, admission and scoring.
//!
//! These tests check that:
//!
//! - Confidence stays in [0, 1] for any content and every variant
//! - A valid agent override always wins over keyword rules
//! - Routing is a pure function of the request
//! - The rate limiter never admits more than its per-minute threshold

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::sync::Arc;

    use crate::agents::{Agent, AgentBehavior, AgentType, RateLimitConfig};
    use crate::llm::Provider;
    use crate::rate_limit::{Clock, ManualClock, RateLimiter};
    use crate::routing::{determine_agent_type, route, RoutingReason, ROUTING_RULES};
    use crate::types::AIRequest;

    fn agent_type() -> impl Strategy<Value = AgentType> {
        prop::sample::select(AgentType::ALL.to_vec())
    }

    fn provider() -> impl Strategy<Value = Provider> {
        prop::sample::select(Provider::ALL.to_vec())
    }

    // Prompts built from routing keywords mixed with filler words
    fn keyword_prompt() -> impl Strategy<Value = String> {
        let words: Vec<&'static str> = ROUTING_RULES
            .iter()
            .flat_map(|r| r.required.iter().chain(r.any_of.iter()).copied())
            .chain(["the", "my", "about", "gravity", "please", "Week"])
            .collect();
        prop::collection::vec(prop::sample::select(words), 0..8).prop_map(|w| w.join(" "))
    }

    // =========================================================================
    // Confidence
    // =========================================================================

    proptest! {
        /// Confidence is clamped for arbitrary content.
        #[test]
        fn confidence_is_bounded(kind in agent_type(), content in ".{0,400}") {
            let agent = Agent::for_type(kind);
            let confidence = agent.calculate_confidence(&content);
            prop_assert!((0.0..=1.0).contains(&confidence), "{} gave {}", kind, confidence);
        }

        /// Keyword-dense content is still clamped.
        #[test]
        fn confidence_is_bounded_for_keyword_content(
            kind in agent_type(),
            content in keyword_prompt(),
        ) {
            let agent = Agent::for_type(kind);
            let confidence = agent.calculate_confidence(&content);
            prop_assert!((0.0..=1.0).contains(&confidence));
        }

        /// Cost is never negative and grows with output.
        #[test]
        fn cost_is_monotonic(
            kind in agent_type(),
            provider in provider(),
            input in 0u64..100_000,
            output in 0u64..100_000,
        ) {
            let agent = Agent::for_type(kind);
            let base = agent.calculate_cost(provider, input, output);
            prop_assert!(base >= 0.0);
            prop_assert!(agent.calculate_cost(provider, input, output + 1000) >= base);
        }
    }

    // =========================================================================
    // Routing
    // =========================================================================

    proptest! {
        /// A valid override beats every keyword rule.
        #[test]
        fn override_takes_precedence(target in agent_type(), prompt in keyword_prompt()) {
            let request = AIRequest::new("u1", prompt).with_agent_type(target);
            let decision = route(&request);
            prop_assert_eq!(decision.agent_type, target);
            prop_assert_eq!(decision.reason, RoutingReason::Override);
        }

        /// Unknown override tags are ignored.
        #[test]
        fn invalid_override_is_ignored(tag in "[A-Z]{1,12}", prompt in keyword_prompt()) {
            let plain = AIRequest::new("u1", prompt.clone());
            let tagged = AIRequest::new("u1", prompt).with_agent_override(tag);
            prop_assert_eq!(determine_agent_type(&tagged), determine_agent_type(&plain));
        }

        /// Routing is deterministic and case-insensitive.
        #[test]
        fn routing_is_deterministic(prompt in keyword_prompt()) {
            let request = AIRequest::new("u1", prompt.clone());
            let first = route(&request);
            prop_assert_eq!(first, route(&request.clone()));
            prop_assert_eq!(
                first.agent_type,
                determine_agent_type(&AIRequest::new("u2", prompt.to_uppercase()))
            );
        }

        /// A keyword decision names the first matching rule.
        #[test]
        fn first_matching_rule_wins(prompt in keyword_prompt()) {
            let lowered = prompt.to_lowercase();
            let expected = ROUTING_RULES.iter().find(|r| r.matches(&lowered));
            let decision = route(&AIRequest::new("u1", prompt));
            match expected {
                Some(rule) => {
                    prop_assert_eq!(decision.agent_type, rule.target);
                    prop_assert_eq!(decision.reason, RoutingReason::Rule(rule.name));
                }
                None => {
                    prop_assert_eq!(decision.agent_type, AgentType::Tutor);
                }
            }
        }
    }

    // =========================================================================
    // Rate limiting
    // =========================================================================

    proptest! {
        /// Within one minute, at most `rpm` requests are admitted.
        #[test]
        fn minute_threshold_is_respected(
            rpm in 1u32..30,
            attempts in 0usize..60,
            step_ms in 0i64..1000,
        ) {
            let clock = Arc::new(ManualClock::new(0));
            let limiter = RateLimiter::with_clock(clock.clone());
            let limits = RateLimitConfig::new(rpm, 10_000);

            let mut admitted = 0u32;
            for _ in 0..attempts {
                // Stay inside the first minute
                if clock.now_ms() + step_ms >= 60_000 {
                    break;
                }
                clock.advance(step_ms);
                if limiter.try_acquire(AgentType::Tutor, Some(&limits)) {
                    admitted += 1;
                }
            }
            prop_assert!(admitted <= rpm);
            prop_assert_eq!(limiter.counts()[&AgentType::Tutor].minute, admitted);
        }
    }
}
