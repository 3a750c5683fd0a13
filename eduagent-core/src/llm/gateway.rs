//! Provider gateway: lazily-initialized clients for every provider.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::error::{Error, Result};

use super::client::{AnthropicClient, ClientConfig, GoogleClient, LLMClient, OpenAIClient};
use super::types::{Provider, TextCompletion, TextCompletionRequest};

/// Credentials and endpoints for the three providers.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub openai: Option<ClientConfig>,
    pub anthropic: Option<ClientConfig>,
    pub google: Option<ClientConfig>,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables.
    ///
    /// A provider is configured only when its API key variable is set.
    pub fn from_env() -> Self {
        let timeout = std::env::var("EDUAGENT_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let load = |key_vars: &[&str], url_var: &str| -> Option<ClientConfig> {
            let key = key_vars
                .iter()
                .find_map(|v| std::env::var(v).ok().filter(|k| !k.is_empty()))?;
            let mut config = ClientConfig::new(key).with_timeout(timeout);
            if let Ok(url) = std::env::var(url_var) {
                config = config.with_base_url(url);
            }
            Some(config)
        };

        Self {
            openai: load(&["OPENAI_API_KEY"], "OPENAI_BASE_URL"),
            anthropic: load(&["ANTHROPIC_API_KEY"], "ANTHROPIC_BASE_URL"),
            google: load(&["GOOGLE_API_KEY", "GEMINI_API_KEY"], "GOOGLE_BASE_URL"),
        }
    }

    pub fn with_provider(mut self, provider: Provider, config: ClientConfig) -> Self {
        match provider {
            Provider::OpenAI => self.openai = Some(config),
            Provider::Anthropic => self.anthropic = Some(config),
            Provider::Google => self.google = Some(config),
        }
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&ClientConfig> {
        match provider {
            Provider::OpenAI => self.openai.as_ref(),
            Provider::Anthropic => self.anthropic.as_ref(),
            Provider::Google => self.google.as_ref(),
        }
    }

    /// Providers that have credentials.
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some())
            .collect()
    }
}

/// Holds one client per provider, each created on first use.
///
/// Pre-built clients can be installed with [`ProviderGateway::with_client`],
/// which is how alternative transports and test doubles are wired in.
pub struct ProviderGateway {
    config: GatewayConfig,
    openai: OnceLock<Arc<dyn LLMClient>>,
    anthropic: OnceLock<Arc<dyn LLMClient>>,
    google: OnceLock<Arc<dyn LLMClient>>,
}

impl ProviderGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            openai: OnceLock::new(),
            anthropic: OnceLock::new(),
            google: OnceLock::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env())
    }

    /// Install a pre-built client for its provider.
    ///
    /// Has no effect if that provider's client was already initialized.
    pub fn with_client(self, client: Arc<dyn LLMClient>) -> Self {
        let _ = self.slot(client.provider()).set(client);
        self
    }

    fn slot(&self, provider: Provider) -> &OnceLock<Arc<dyn LLMClient>> {
        match provider {
            Provider::OpenAI => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Google => &self.google,
        }
    }

    fn build_client(&self, provider: Provider) -> Result<Arc<dyn LLMClient>> {
        let config = self.config.get(provider).cloned().ok_or_else(|| {
            Error::Config(format!("No API key configured for provider: {}", provider))
        })?;

        let client: Arc<dyn LLMClient> = match provider {
            Provider::OpenAI => Arc::new(OpenAIClient::new(config)?),
            Provider::Anthropic => Arc::new(AnthropicClient::new(config)?),
            Provider::Google => Arc::new(GoogleClient::new(config)?),
        };
        info!(%provider, "Initialized provider client");
        Ok(client)
    }

    /// Get (creating on first access) the client for a provider.
    pub fn client(&self, provider: Provider) -> Result<Arc<dyn LLMClient>> {
        let slot = self.slot(provider);
        if let Some(client) = slot.get() {
            return Ok(Arc::clone(client));
        }
        let client = self.build_client(provider)?;
        // A concurrent initializer may have won; either instance is equivalent.
        Ok(Arc::clone(slot.get_or_init(|| client)))
    }

    /// Whether a client exists or can be created for this provider.
    pub fn is_available(&self, provider: Provider) -> bool {
        self.slot(provider).get().is_some() || self.config.get(provider).is_some()
    }

    /// Complete using a specific provider.
    pub async fn complete(
        &self,
        provider: Provider,
        request: TextCompletionRequest,
    ) -> Result<TextCompletion> {
        let client = self.client(provider)?;
        debug!(%provider, model = %request.model, "Dispatching completion");
        client.complete(request).await
    }

    /// Probe a single provider. Unconfigured providers report `false`.
    pub async fn health_probe(&self, provider: Provider) -> bool {
        match self.client(provider) {
            Ok(client) => client.health_probe().await,
            Err(_) => false,
        }
    }

    /// Probe every provider.
    pub async fn health_probe_all(&self) -> HashMap<Provider, bool> {
        let mut results = HashMap::new();
        for provider in Provider::ALL {
            results.insert(provider, self.health_probe(provider).await);
        }
        results
    }
}

impl Default for ProviderGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}
