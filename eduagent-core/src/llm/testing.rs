//! Scripted provider client for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

use super::client::LLMClient;
use super::types::{Provider, TextCompletion, TextCompletionRequest};

/// Provider client that returns a canned completion or a canned failure,
/// recording every request it receives.
pub struct ScriptedClient {
    provider: Provider,
    reply: Option<TextCompletion>,
    calls: AtomicUsize,
    requests: Mutex<Vec<TextCompletionRequest>>,
}

impl ScriptedClient {
    pub fn succeeding(provider: Provider, text: impl Into<String>) -> Self {
        Self::with_reply(provider, Some(TextCompletion::new(text)))
    }

    pub fn succeeding_with_usage(
        provider: Provider,
        text: impl Into<String>,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Self {
        Self::with_reply(
            provider,
            Some(TextCompletion::new(text).with_usage(input_tokens, output_tokens)),
        )
    }

    pub fn failing(provider: Provider) -> Self {
        Self::with_reply(provider, None)
    }

    fn with_reply(provider: Provider, reply: Option<TextCompletion>) -> Self {
        Self {
            provider,
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TextCompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, request: TextCompletionRequest) -> Result<TextCompletion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        self.reply
            .clone()
            .ok_or_else(|| Error::provider(self.provider, "scripted failure"))
    }

    async fn health_probe(&self) -> bool {
        self.reply.is_some()
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}
