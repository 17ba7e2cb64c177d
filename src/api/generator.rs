//! Text-generation backends used to execute chain steps.

use async_trait::async_trait;
use llm::chat::ChatMessage;
use llm::LLMProvider;
use tokio_util::sync::CancellationToken;

use super::error::GenerationError;

/// A service that turns a rendered prompt into text.
///
/// Implementations should watch `cancel` while their call is outstanding and
/// return [`GenerationError::Aborted`] once it fires. The step executor races
/// the call against the token as well, so a backend that ignores it only
/// delays the abort.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError>;
}

/// Generator backed by a provider from the `llm` crate.
///
/// The rendered prompt is sent as a single user chat message.
pub struct LlmGenerator {
    provider: Box<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let messages = vec![ChatMessage::user().content(prompt).build()];

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Aborted),
            resp = self.provider.chat(&messages) => {
                resp.map_err(|e| GenerationError::Unavailable(e.to_string()))?
            }
        };

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}

/// Offline generator that answers with its input, prefixed.
///
/// Handy for checking how a chain threads outputs between steps without
/// calling a real model.
#[derive(Debug, Clone, Default)]
pub struct EchoGenerator {
    prefix: String,
}

impl EchoGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Aborted);
        }
        Ok(format!("{}{}", self.prefix, prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_prefixes_prompt() {
        let echo = EchoGenerator::new("echo:");
        let out = echo.generate("hi", &CancellationToken::new()).await;
        assert_eq!(out, Ok("echo:hi".to_string()));
    }

    #[tokio::test]
    async fn echo_honours_cancellation() {
        let echo = EchoGenerator::new("echo:");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(echo.generate("hi", &cancel).await, Err(GenerationError::Aborted));
    }
}
