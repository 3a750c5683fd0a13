//! # eduagent-core
//!
//! Agent orchestration for an education assistant: requests are routed to
//! one of seven specialized agents, admitted against per-agent rate limits,
//! and answered by an LLM provider with a single fallback.
//!
//! ## Core Components
//!
//! - **Agents**: Tutor, Content Creator, Assessment, Analytics, Mentor,
//!   Study Planner and Doubt Solver, each with its own prompt shape and
//!   confidence heuristics
//! - **Routing**: explicit override, then an ordered keyword cascade
//! - **Rate limiting**: minute and hour counters per agent type
//! - **Provider gateway**: lazily created OpenAI, Anthropic and Gemini clients
//! - **Manager**: the caller-facing API tying these together
//!
//! ## Example
//!
//! ```rust,ignore
//! use eduagent_core::{AgentManager, AIRequest, ProviderGateway};
//!
//! let manager = AgentManager::new(ProviderGateway::from_env());
//! let response = manager
//!     .route_request(AIRequest::new("user-1", "I need a quiz on photosynthesis"), None)
//!     .await?;
//! assert_eq!(response.agent_type.as_str(), "assessment");
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod manager;
pub mod normalize;
mod proptest;
pub mod rate_limit;
pub mod registry;
pub mod routing;
pub mod types;
pub mod usage;

// Re-exports for convenience
pub use agents::{
    Agent, AgentBehavior, AgentConfig, AgentConfigPatch, AgentSummary, AgentType,
    RateLimitConfig,
};
pub use config::OrchestratorConfig;
pub use error::{Error, Result};
pub use llm::{ClientConfig, GatewayConfig, LLMClient, Provider, ProviderGateway};
pub use manager::AgentManager;
pub use rate_limit::{Clock, ManualClock, RateLimiter, RequestCounts, SystemClock};
pub use registry::AgentRegistry;
pub use routing::{determine_agent_type, RoutingDecision, RoutingReason, ROUTING_RULES};
pub use types::{
    AIRequest, AIResponse, ConversationContext, ConversationTurn, RequestContext,
    RequestMetadata, ResponseFormat, Role, Usage,
};
pub use usage::{UsageTotals, UsageTracker};
