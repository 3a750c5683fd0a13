//! Response normalization.
//!
//! Provider completions differ in whether they report token usage at all.
//! Everything that reaches a caller goes through here so `usage`, `cost` and
//! `processing_time` are always present on a successful response.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::time::Instant;
use uuid::Uuid;

use crate::agents::{clamp_confidence, AgentBehavior, AgentType};
use crate::llm::{estimate_tokens, Provider, TextCompletion, TextCompletionRequest};
use crate::types::{AIRequest, AIResponse, Usage};

/// Milliseconds elapsed since `started`.
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Token usage for a completion, estimating whatever the provider left out.
///
/// Input is estimated from the system and user prompts actually sent. Counts
/// from a provider whose usage is not consumed ([`Provider::reports_usage`])
/// are ignored and estimated too.
pub fn resolve_usage<A: AgentBehavior + ?Sized>(
    agent: &A,
    answered_by: Provider,
    sent: &TextCompletionRequest,
    completion: &TextCompletion,
) -> Usage {
    let mut estimated = false;
    let reported = |count: Option<u64>| count.filter(|_| answered_by.reports_usage());

    let input_tokens = reported(completion.input_tokens).unwrap_or_else(|| {
        estimated = true;
        estimate_tokens(&sent.system_prompt) + estimate_tokens(&sent.user_prompt)
    });
    let output_tokens = reported(completion.output_tokens).unwrap_or_else(|| {
        estimated = true;
        estimate_tokens(&completion.text)
    });

    Usage {
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
        cost: agent.calculate_cost(answered_by, input_tokens, output_tokens),
        estimated,
    }
}

/// Fold a provider completion into an [`AIResponse`].
///
/// Metadata is the variant's annotations; fallback flags are added by the
/// caller.
pub fn normalize<A: AgentBehavior + ?Sized>(
    agent: &A,
    request: &AIRequest,
    answered_by: Provider,
    sent: &TextCompletionRequest,
    completion: TextCompletion,
    started: Instant,
) -> AIResponse {
    let usage = resolve_usage(agent, answered_by, sent, &completion);
    let confidence = clamp_confidence(agent.calculate_confidence(&completion.text));
    let mut metadata = agent.annotate(request, &completion.text);
    metadata.insert("model".into(), json!(sent.model));

    AIResponse {
        id: Uuid::new_v4().to_string(),
        agent_type: agent.agent_type(),
        provider: answered_by,
        content: completion.text,
        confidence,
        metadata,
        usage: Some(usage),
        timestamp: Utc::now(),
        processing_time: elapsed_ms(started),
    }
}

/// The response returned when no provider could answer.
pub fn degraded(
    agent_type: AgentType,
    primary: Provider,
    content: &str,
    reason: &str,
    started: Instant,
) -> AIResponse {
    let mut metadata = Map::new();
    metadata.insert("error".into(), Value::Bool(true));
    metadata.insert("reason".into(), json!(reason));

    AIResponse {
        id: Uuid::new_v4().to_string(),
        agent_type,
        provider: primary,
        content: content.to_string(),
        confidence: 0.1,
        metadata,
        usage: None,
        timestamp: Utc::now(),
        processing_time: elapsed_ms(started),
    }
}
