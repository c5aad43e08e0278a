//! Wellness agent — injury and recovery advice from a single fixed template.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{error_reply, Agent, AgentReply};
use crate::llm::CompletionGateway;
use crate::prompts::{render, PromptStore};

/// Wellness-advice agent.
pub struct RecoveryAgent {
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptStore>,
}

impl RecoveryAgent {
    pub fn new(gateway: Arc<dyn CompletionGateway>, prompts: Arc<PromptStore>) -> Self {
        Self { gateway, prompts }
    }
}

#[async_trait]
impl Agent for RecoveryAgent {
    fn name(&self) -> &'static str {
        "recovery"
    }

    async fn handle(&self, input: &str) -> AgentReply {
        let result = async {
            let template = self.prompts.resolve("recovery")?;
            let prompt = render(template, &[("user_input", input)]);
            Ok::<_, crate::error::Error>(self.gateway.complete(&prompt).await?)
        }
        .await;

        match result {
            Ok(text) => AgentReply::text(text),
            Err(e) => AgentReply::text(error_reply("recovery agent", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGateway;

    #[tokio::test]
    async fn returns_gateway_text() {
        let gateway = Arc::new(ScriptedGateway::always("rest, ice, see a physio"));
        let agent = RecoveryAgent::new(gateway.clone(), Arc::new(PromptStore::builtin()));

        let reply = agent.handle("my elbow hurts after armbars").await;
        assert_eq!(reply.text, "rest, ice, see a physio");
        assert!(reply.subroute.is_none());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn gateway_failure_becomes_error_text() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let agent = RecoveryAgent::new(gateway, Arc::new(PromptStore::builtin()));

        let reply = agent.handle("tweaked my knee").await;
        assert!(reply.text.starts_with("Error in recovery agent:"));
    }
}
