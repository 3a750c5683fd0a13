//! Request processing: primary call, fallback, degraded response.

use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::{Agent, AgentBehavior};
use crate::error::{Error, Result};
use crate::llm::{Provider, ProviderGateway, TextCompletion, TextCompletionRequest};
use crate::normalize;
use crate::types::{AIRequest, AIResponse, ConversationContext};

/// Content of the response returned when every provider failed.
pub const DEGRADED_CONTENT: &str = "I'm sorry, I'm having trouble processing your request \
right now. Please try again in a moment.";

/// Confidence multiplier applied when the fallback provider answered.
const FALLBACK_DISCOUNT: f64 = 0.9;

/// Outcome of the provider chain before normalization.
struct Answered {
    provider: Provider,
    sent: TextCompletionRequest,
    completion: TextCompletion,
    primary_error: Option<String>,
}

impl Agent {
    /// Process a request. Never fails: provider errors end in the fallback
    /// provider's answer or in a degraded response.
    pub async fn process_request(
        &self,
        gateway: &ProviderGateway,
        request: &AIRequest,
        context: Option<&ConversationContext>,
    ) -> AIResponse {
        self.process_request_since(gateway, request, context, Instant::now())
            .await
    }

    /// Like [`Agent::process_request`], timing from `started` (request receipt).
    #[instrument(skip_all, fields(agent = %self.agent_type(), user = %request.user_id))]
    pub async fn process_request_since(
        &self,
        gateway: &ProviderGateway,
        request: &AIRequest,
        context: Option<&ConversationContext>,
        started: Instant,
    ) -> AIResponse {
        let primary = self.config().provider;

        match self.run_chain(gateway, request, context).await {
            Ok(answered) => {
                let fell_back = answered.primary_error.is_some();
                let mut response = normalize::normalize(
                    self,
                    request,
                    answered.provider,
                    &answered.sent,
                    answered.completion,
                    started,
                );
                if let Some(primary_error) = answered.primary_error {
                    response.confidence *= FALLBACK_DISCOUNT;
                    response.metadata.insert("fallback".into(), Value::Bool(true));
                    response
                        .metadata
                        .insert("originalProvider".into(), json!(primary));
                    response
                        .metadata
                        .insert("primaryError".into(), json!(primary_error));
                }
                info!(
                    provider = %response.provider,
                    fallback = fell_back,
                    confidence = response.confidence,
                    processing_ms = response.processing_time,
                    "Request succeeded"
                );
                response
            }
            Err(e) => {
                warn!(error = %e, "Returning degraded response");
                normalize::degraded(
                    self.agent_type(),
                    primary,
                    DEGRADED_CONTENT,
                    &e.to_string(),
                    started,
                )
            }
        }
    }

    /// The completion request for a provider call.
    fn completion_request(
        &self,
        model: String,
        user_prompt: String,
        structured: bool,
    ) -> TextCompletionRequest {
        let config = self.config();
        TextCompletionRequest::new(model, user_prompt)
            .with_system(config.system_prompt.clone())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_structured_output(structured)
    }

    async fn run_chain(
        &self,
        gateway: &ProviderGateway,
        request: &AIRequest,
        context: Option<&ConversationContext>,
    ) -> Result<Answered> {
        let config = self.config();
        let structured = request.wants_structured();

        let sent = self.completion_request(
            config.model.clone(),
            self.build_prompt(request, context, structured),
            structured,
        );
        debug!(provider = %config.provider, model = %config.model, structured, "Prompt built");

        let primary_error = match gateway.complete(config.provider, sent.clone()).await {
            Ok(completion) => {
                return Ok(Answered {
                    provider: config.provider,
                    sent,
                    completion,
                    primary_error: None,
                })
            }
            Err(e) => e,
        };

        let Some((fallback, model)) = config.fallback_target() else {
            warn!(
                provider = %config.provider,
                error = %primary_error,
                "Primary failed, no fallback configured"
            );
            return Err(Error::fallback_exhausted(
                self.agent_type(),
                primary_error.to_string(),
            ));
        };
        warn!(
            provider = %config.provider,
            fallback = %fallback,
            error = %primary_error,
            "Primary failed, trying fallback"
        );

        // Fallback providers are not asked for structured output.
        let sent =
            self.completion_request(model, self.build_prompt(request, context, false), false);
        match gateway.complete(fallback, sent.clone()).await {
            Ok(completion) => Ok(Answered {
                provider: fallback,
                sent,
                completion,
                primary_error: Some(primary_error.to_string()),
            }),
            Err(fallback_error) => Err(Error::fallback_exhausted(
                self.agent_type(),
                format!("primary: {}; fallback: {}", primary_error, fallback_error),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentConfig, AgentType};
    use crate::llm::testing::ScriptedClient;
    use crate::types::{RequestMetadata, ResponseFormat};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_primary_success() {
        let primary = Arc::new(ScriptedClient::succeeding_with_usage(
            Provider::OpenAI,
            "Step 1: gravity pulls. For example, apples fall.",
            120,
            40,
        ));
        let gateway = ProviderGateway::default().with_client(primary.clone());
        let agent = Agent::for_type(AgentType::Tutor);

        let response = agent
            .process_request(&gateway, &AIRequest::new("u1", "What is gravity?"), None)
            .await;

        assert_eq!(response.provider, Provider::OpenAI);
        assert!(!response.is_fallback());
        assert!((response.confidence - 0.9).abs() < 1e-9);
        let usage = response.usage.unwrap();
        assert_eq!(usage.total_tokens, 160);
        assert!(!usage.estimated);

        let sent = &primary.requests()[0];
        assert_eq!(sent.model, "gpt-4o");
        assert_eq!(sent.max_tokens, 2000);
        assert!(sent.user_prompt.contains("Request: What is gravity?"));
    }

    #[tokio::test]
    async fn test_fallback_on_primary_failure() {
        let fallback = Arc::new(ScriptedClient::succeeding(
            Provider::Anthropic,
            "Step 1: gravity pulls. For example, apples fall.",
        ));
        let gateway = ProviderGateway::default()
            .with_client(Arc::new(ScriptedClient::failing(Provider::OpenAI)))
            .with_client(fallback.clone());
        let agent = Agent::for_type(AgentType::Tutor);
        let request = AIRequest::new("u1", "What is gravity?")
            .with_metadata(RequestMetadata::new().with_format(ResponseFormat::Json));

        let response = agent.process_request(&gateway, &request, None).await;

        assert_eq!(response.provider, Provider::Anthropic);
        assert!(response.is_fallback());
        assert_eq!(response.metadata["originalProvider"], "openai");
        assert!((response.confidence - 0.9 * 0.9).abs() < 1e-9);
        assert!(response.usage.unwrap().estimated);

        let sent = &fallback.requests()[0];
        assert_eq!(sent.model, Provider::Anthropic.default_model());
        assert!(!sent.structured_output);
        assert!(!sent.user_prompt.contains("valid JSON"));
    }

    #[tokio::test]
    async fn test_fallback_model_override() {
        let fallback = Arc::new(ScriptedClient::succeeding(Provider::OpenAI, "done"));
        let gateway = ProviderGateway::default()
            .with_client(Arc::new(ScriptedClient::failing(Provider::Anthropic)))
            .with_client(fallback.clone());
        let agent = Agent::for_type(AgentType::ContentCreator);

        let response = agent
            .process_request(&gateway, &AIRequest::new("u1", "create a lesson"), None)
            .await;

        assert_eq!(response.provider, Provider::OpenAI);
        assert_eq!(fallback.requests()[0].model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_degraded_when_both_fail() {
        let gateway = ProviderGateway::default()
            .with_client(Arc::new(ScriptedClient::failing(Provider::Anthropic)))
            .with_client(Arc::new(ScriptedClient::failing(Provider::Google)));
        let agent = Agent::for_type(AgentType::Mentor);

        let response = agent
            .process_request(&gateway, &AIRequest::new("u1", "career advice"), None)
            .await;

        assert_eq!(response.content, DEGRADED_CONTENT);
        assert_eq!(response.confidence, 0.1);
        assert!(response.is_degraded());
        assert_eq!(response.provider, Provider::Anthropic);
    }

    #[tokio::test]
    async fn test_degraded_without_fallback() {
        let primary = Arc::new(ScriptedClient::failing(Provider::OpenAI));
        let gateway = ProviderGateway::default().with_client(primary.clone());
        let config = AgentConfig::new(Provider::OpenAI, "gpt-4o").with_system_prompt("Help.");
        let agent = Agent::with_config(AgentType::DoubtSolver, config);

        let response = agent
            .process_request(&gateway, &AIRequest::new("u1", "solve x"), None)
            .await;

        assert!(response.is_degraded());
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_providers_degrade() {
        // No credentials anywhere: client creation fails, which is recovered.
        let gateway = ProviderGateway::default();
        let agent = Agent::for_type(AgentType::Analytics);

        let response = agent
            .process_request(&gateway, &AIRequest::new("u1", "my progress"), None)
            .await;

        assert!(response.is_degraded());
        assert_eq!(response.provider, Provider::Google);
    }
}
