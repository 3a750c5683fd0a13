//! The caller-facing orchestration API.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::agents::{Agent, AgentBehavior, AgentSummary, AgentType};
use crate::config::OrchestratorConfig;
use crate::error::{Error, Result};
use crate::llm::{Provider, ProviderGateway};
use crate::rate_limit::{Clock, RateLimiter, RequestCounts};
use crate::registry::AgentRegistry;
use crate::routing;
use crate::types::{AIRequest, AIResponse, ConversationContext};
use crate::usage::UsageTracker;

/// Routes requests to agents, enforcing per-agent rate limits.
///
/// Construct one per process and share it behind an `Arc`; every method
/// takes `&self`.
///
/// # Example
///
/// ```rust,ignore
/// use eduagent_core::{AgentManager, AIRequest, ProviderGateway};
///
/// let manager = AgentManager::new(ProviderGateway::from_env());
/// let response = manager
///     .route_request(AIRequest::new("user-1", "Explain photosynthesis"), None)
///     .await?;
/// ```
pub struct AgentManager {
    registry: AgentRegistry,
    gateway: ProviderGateway,
    limiter: RateLimiter,
    usage: Mutex<UsageTracker>,
}

impl AgentManager {
    /// A manager with every agent at its default configuration.
    pub fn new(gateway: ProviderGateway) -> Self {
        Self::with_registry(AgentRegistry::with_defaults(), gateway)
    }

    pub fn with_registry(registry: AgentRegistry, gateway: ProviderGateway) -> Self {
        Self {
            registry,
            gateway,
            limiter: RateLimiter::new(),
            usage: Mutex::new(UsageTracker::new()),
        }
    }

    /// Build from configuration: provider credentials plus agent overrides.
    pub fn from_config(config: OrchestratorConfig) -> Self {
        let registry = AgentRegistry::with_overrides(&config.agent_overrides);
        Self::with_registry(registry, ProviderGateway::new(config.gateway))
    }

    /// Build from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(OrchestratorConfig::from_env()?))
    }

    /// Replace the rate limiter's time source. Counters start fresh.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.limiter = RateLimiter::with_clock(clock);
        self
    }

    /// Route and process a request.
    ///
    /// Fails only with `Validation`, `AgentNotFound` or `RateLimitExceeded`;
    /// provider failures come back as fallback or degraded responses. A
    /// rejected request is not counted.
    #[instrument(skip_all, fields(user = %request.user_id))]
    pub async fn route_request(
        &self,
        request: AIRequest,
        context: Option<&ConversationContext>,
    ) -> Result<AIResponse> {
        let started = Instant::now();
        request.validate()?;

        let decision = routing::route(&request);
        debug!(agent = %decision.agent_type, reason = ?decision.reason, "Routed request");

        let agent = self.registry.get(decision.agent_type)?;
        if !self
            .limiter
            .try_acquire(decision.agent_type, agent.config().rate_limiting.as_ref())
        {
            warn!(agent = %decision.agent_type, "Rate limit exceeded");
            return Err(Error::rate_limit_exceeded(decision.agent_type));
        }

        let response = agent
            .process_request_since(&self.gateway, &request, context, started)
            .await;
        self.usage.lock().record(&response);
        Ok(response)
    }

    /// The agent type a request would be routed to.
    pub fn determine_agent_type(&self, request: &AIRequest) -> AgentType {
        routing::determine_agent_type(request)
    }

    pub fn get_agent(&self, agent_type: AgentType) -> Result<&Agent> {
        self.registry.get(agent_type)
    }

    /// In-memory agent health. Never touches the network.
    pub fn health_check(&self) -> HashMap<AgentType, bool> {
        self.registry.health_check()
    }

    /// Probe every provider over the network.
    pub async fn provider_health(&self) -> HashMap<Provider, bool> {
        self.gateway.health_probe_all().await
    }

    pub fn get_request_counts(&self) -> HashMap<AgentType, RequestCounts> {
        self.limiter.counts()
    }

    pub fn get_agent_configs(&self) -> HashMap<AgentType, AgentSummary> {
        self.registry.configs()
    }

    pub fn reset_rate_limits(&self) {
        self.limiter.reset_all();
        info!("Request counters cleared");
    }

    /// Whether a request for `agent_type` would currently be admitted.
    pub fn check_rate_limit(&self, agent_type: AgentType) -> Result<bool> {
        let agent = self.registry.get(agent_type)?;
        Ok(self
            .limiter
            .check(agent_type, agent.config().rate_limiting.as_ref()))
    }

    /// Count a request admitted through [`AgentManager::check_rate_limit`].
    pub fn increment_request_count(&self, agent_type: AgentType) {
        self.limiter.increment(agent_type);
    }

    /// Snapshot of accumulated usage.
    pub fn usage(&self) -> UsageTracker {
        self.usage.lock().clone()
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }
}

impl std::fmt::Debug for AgentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentManager")
            .field("registry", &self.registry)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
