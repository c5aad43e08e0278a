//! Completion gateway — the boundary to the text-generation service.
//!
//! The rest of the crate only sees the [`CompletionGateway`] trait: one
//! fallible call from prompt text to reply text. The concrete client speaks
//! the OpenAI-compatible chat-completions HTTP API.

mod openai;
pub(crate) mod retry;
#[cfg(test)]
pub(crate) mod testing;

pub use openai::OpenAiGateway;

use async_trait::async_trait;

use crate::error::GatewayError;

/// Synchronous-in-shape completion call: text in, text out, may fail.
///
/// Implementations own their timeout; a timeout surfaces as an ordinary
/// [`GatewayError`], never as a hang or a panic.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Complete a prompt. The returned text is trimmed.
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}
