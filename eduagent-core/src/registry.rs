//! Agent registry: one live agent per agent type.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::agents::{Agent, AgentBehavior, AgentConfigPatch, AgentSummary, AgentType};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentType, Agent>,
}

impl AgentRegistry {
    /// A registry with no agents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every variant with its default configuration.
    pub fn with_defaults() -> Self {
        Self::with_overrides(&HashMap::new())
    }

    /// Every variant, with `overrides` applied on top of the defaults.
    pub fn with_overrides(overrides: &HashMap<AgentType, AgentConfigPatch>) -> Self {
        let mut registry = Self::empty();
        for agent_type in AgentType::ALL {
            let agent = match overrides.get(&agent_type) {
                Some(patch) => {
                    let config = patch.apply(Agent::default_config(agent_type));
                    if !config.is_well_formed() {
                        warn!(%agent_type, "Overridden agent config is not well formed");
                    }
                    Agent::with_config(agent_type, config)
                }
                None => Agent::for_type(agent_type),
            };
            registry.insert(agent_type, agent);
        }
        debug!(agents = registry.len(), "Agent registry built");
        registry
    }

    /// Register `agent` under `agent_type`, replacing any previous entry.
    pub fn insert(&mut self, agent_type: AgentType, agent: Agent) -> Option<Agent> {
        self.agents.insert(agent_type, agent)
    }

    pub fn get(&self, agent_type: AgentType) -> Result<&Agent> {
        self.agents
            .get(&agent_type)
            .ok_or_else(|| Error::agent_not_found(agent_type))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// In-memory health of every agent type. Unregistered types report
    /// `false`, as do agents registered under a key other than their own
    /// type or with a malformed config.
    pub fn health_check(&self) -> HashMap<AgentType, bool> {
        AgentType::ALL
            .into_iter()
            .map(|agent_type| {
                let healthy = self.agents.get(&agent_type).is_some_and(|agent| {
                    agent.agent_type() == agent_type && agent.config().is_well_formed()
                });
                (agent_type, healthy)
            })
            .collect()
    }

    /// Summaries of every registered agent.
    pub fn configs(&self) -> HashMap<AgentType, AgentSummary> {
        self.agents
            .iter()
            .map(|(agent_type, agent)| (*agent_type, agent.summary()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentType, &Agent)> {
        self.agents.iter()
    }
}
