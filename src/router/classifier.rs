//! LLM-backed classifier — decides which agent owns a request.
//!
//! Total function: any fault from the template store or the gateway degrades
//! to the default category. Classification can be wrong, never absent.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::CompletionGateway;
use crate::prompts::{render, PromptStore};

/// The closed set of request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Technique and general coaching questions. The default: ambiguous
    /// classifier output degrades to the most general-purpose agent.
    #[default]
    Technique,
    /// Tournament game-plan requests.
    Plan,
    /// Injury, health, and recovery questions.
    Wellness,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technique => "technique",
            Self::Plan => "plan",
            Self::Wellness => "wellness",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier over the completion gateway.
pub struct Classifier {
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptStore>,
}

impl Classifier {
    pub fn new(gateway: Arc<dyn CompletionGateway>, prompts: Arc<PromptStore>) -> Self {
        Self { gateway, prompts }
    }

    /// Classify a request. Never fails; faults degrade to the default.
    pub async fn classify(&self, input: &str) -> Category {
        match self.try_classify(input).await {
            Ok(category) => category,
            Err(e) => {
                warn!(error = %e, "Classification failed, using default category");
                Category::default()
            }
        }
    }

    async fn try_classify(&self, input: &str) -> Result<Category, crate::error::Error> {
        let template = self.prompts.resolve("router")?;
        let prompt = render(template, &[("user_input", input)]);
        let reply = self.gateway.complete(&prompt).await?;
        let category = parse_label(&reply);
        debug!(category = %category, reply = %reply.chars().take(60).collect::<String>(), "Classified");
        Ok(category)
    }
}

/// Map classifier output text to a category.
///
/// First-match precedence: the technique indicator wins over the plan
/// indicators, which win over the wellness indicators. No match at all is
/// the technique category.
fn parse_label(reply: &str) -> Category {
    let lower = reply.to_lowercase();
    if lower.contains("coach") {
        Category::Technique
    } else if lower.contains("game_plan") || lower.contains("game plan") || lower.contains("tournament") {
        Category::Plan
    } else if lower.contains("injury") || lower.contains("health") {
        Category::Wellness
    } else {
        Category::Technique
    }
}
