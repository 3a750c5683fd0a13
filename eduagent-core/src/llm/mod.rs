//! Provider gateway: LLM clients for OpenAI, Anthropic and Google Gemini.
//!
//! Each provider exposes a single "generate text from prompt" operation and a
//! health probe behind the [`LLMClient`] trait. [`ProviderGateway`] owns one
//! lazily-created client per provider.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eduagent_core::llm::{GatewayConfig, Provider, ProviderGateway, TextCompletionRequest};
//!
//! let gateway = ProviderGateway::new(GatewayConfig::from_env());
//! let request = TextCompletionRequest::new("gpt-4o", "Explain photosynthesis")
//!     .with_system("You are a patient tutor.")
//!     .with_max_tokens(500);
//!
//! let completion = gateway.complete(Provider::OpenAI, request).await?;
//! ```

mod client;
mod gateway;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use client::{AnthropicClient, ClientConfig, GoogleClient, LLMClient, OpenAIClient};
pub use gateway::{GatewayConfig, ProviderGateway};
pub use types::{estimate_tokens, Pricing, Provider, TextCompletion, TextCompletionRequest};
