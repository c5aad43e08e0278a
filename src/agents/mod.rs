//! Specialized agents — one per request category.
//!
//! Every agent satisfies the same contract: text in, [`AgentReply`] out,
//! never an error. Faults from the template store or the completion gateway
//! are converted to reply text carrying an `Error` marker, so the router's
//! no-throw guarantee holds without any handling upstream.

pub mod extract;

mod coach;
mod game_plan;
mod recovery;

pub use coach::{CoachAgent, Persona};
pub use game_plan::GamePlanAgent;
pub use recovery::RecoveryAgent;

use async_trait::async_trait;

/// Reply from an agent. Always well-formed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    /// Set when the agent re-delegated to an internal subroute instead of
    /// its main path (e.g. the coach's progress tracker).
    pub subroute: Option<&'static str>,
}

impl AgentReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subroute: None,
        }
    }

    pub fn subrouted(text: impl Into<String>, subroute: &'static str) -> Self {
        Self {
            text: text.into(),
            subroute: Some(subroute),
        }
    }
}

/// Uniform agent contract. `handle` must not fail under any input or any
/// collaborator fault.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable agent name, used for logging.
    fn name(&self) -> &'static str;

    async fn handle(&self, input: &str) -> AgentReply;
}

/// Format a fault as reply text. Single formatting point so every failure
/// carries the same marker the front-ends can display as-is.
pub(crate) fn error_reply(context: &str, error: &dyn std::fmt::Display) -> String {
    format!("Error in {context}: {error}")
}
