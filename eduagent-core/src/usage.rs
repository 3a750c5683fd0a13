//! Accumulated token usage and cost, for operational visibility.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agents::AgentType;
use crate::llm::Provider;
use crate::types::AIResponse;

/// Totals for one agent type or provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub request_count: u64,
}

impl UsageTotals {
    fn add(&mut self, input_tokens: u64, output_tokens: u64, cost: f64) {
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
        self.cost += cost;
        self.request_count += 1;
    }
}

/// Usage across all responses served by a manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTracker {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    /// Total cost in USD
    pub total_cost: f64,
    /// Responses recorded, degraded ones included
    pub request_count: u64,
    /// Responses served by a fallback provider
    pub fallback_count: u64,
    /// Responses where no provider answered
    pub degraded_count: u64,
    /// Responses whose token counts were estimated
    pub estimated_count: u64,
    pub by_agent: HashMap<AgentType, UsageTotals>,
    pub by_provider: HashMap<Provider, UsageTotals>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response returned to a caller.
    pub fn record(&mut self, response: &AIResponse) {
        self.request_count += 1;
        if response.is_fallback() {
            self.fallback_count += 1;
        }
        if response.is_degraded() {
            self.degraded_count += 1;
        }

        let (input, output, cost) = match &response.usage {
            Some(usage) => {
                if usage.estimated {
                    self.estimated_count += 1;
                }
                (usage.input_tokens, usage.output_tokens, usage.cost)
            }
            None => (0, 0, 0.0),
        };
        self.total_input_tokens += input;
        self.total_output_tokens += output;
        self.total_cost += cost;

        self.by_agent
            .entry(response.agent_type)
            .or_default()
            .add(input, output, cost);
        // Degraded responses name the primary provider, which did not answer.
        if !response.is_degraded() {
            self.by_provider
                .entry(response.provider)
                .or_default()
                .add(input, output, cost);
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}
