//! Technique agent — persona-flavored coaching replies.
//!
//! Two keyword subroutes run before the persona path:
//! - progress tracking ("track", "progress", …) writes a progress row
//!   instead of calling the gateway
//! - technique lookup ("video", "show me", …) answers from the lookup
//!   template, skipping the persona entirely
//!
//! Both report their subroute so the router can surface it; the category
//! stays "technique" either way.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agents::extract::{self, ProgressEntry};
use crate::agents::{error_reply, Agent, AgentReply};
use crate::llm::CompletionGateway;
use crate::prompts::{render, PromptStore};
use crate::store::{NewProgress, Store};

const PROGRESS_TRIGGERS: &[&str] = &["track", "progress", "learning", "practicing"];
const LOOKUP_TRIGGERS: &[&str] = &["video", "show me", "demonstrate", "how to"];

/// The fixed persona set for coaching replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    #[default]
    James,
    Maria,
    Viktor,
}

impl Persona {
    /// Parse a persona name; unknown names fall back to the default.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "james" => Self::James,
            "maria" => Self::Maria,
            "viktor" => Self::Viktor,
            other => {
                warn!(persona = other, "Unknown persona, using default");
                Self::default()
            }
        }
    }

    /// Template name for this persona.
    fn template(&self) -> &'static str {
        match self {
            Self::James => "personas/james",
            Self::Maria => "personas/maria",
            Self::Viktor => "personas/viktor",
        }
    }
}

/// Technique-advice agent.
pub struct CoachAgent {
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptStore>,
    store: Arc<dyn Store>,
    persona: Persona,
    student: String,
}

impl CoachAgent {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        prompts: Arc<PromptStore>,
        store: Arc<dyn Store>,
        persona: Persona,
        student: String,
    ) -> Self {
        Self {
            gateway,
            prompts,
            store,
            persona,
            student,
        }
    }

    async fn track_progress(&self, entry: ProgressEntry) -> AgentReply {
        let new = NewProgress {
            student: self.student.clone(),
            technique: entry.technique.clone(),
            level: entry.level.clone(),
            notes: entry.notes.clone(),
        };
        match self.store.record_progress(&new).await {
            Ok(id) => {
                debug!(id, technique = %entry.technique, "Progress recorded");
                AgentReply::subrouted(
                    format!(
                        "Progress tracked!\nTechnique: {}\nLevel: {}\nNotes: {}",
                        entry.technique, entry.level, entry.notes
                    ),
                    "progress",
                )
            }
            Err(e) => AgentReply::subrouted(error_reply("progress tracking", &e), "progress"),
        }
    }

    async fn lookup_technique(&self, input: &str) -> AgentReply {
        let result = async {
            let template = self.prompts.resolve("technique_lookup")?;
            let prompt = render(template, &[("user_input", input)]);
            Ok::<_, crate::error::Error>(self.gateway.complete(&prompt).await?)
        }
        .await;

        match result {
            Ok(text) => AgentReply::subrouted(text, "lookup"),
            Err(e) => AgentReply::subrouted(error_reply("technique lookup", &e), "lookup"),
        }
    }

    async fn persona_reply(&self, input: &str) -> AgentReply {
        let result = async {
            let persona_text = self.prompts.resolve(self.persona.template())?;
            let base = self.prompts.resolve("coach_base")?;
            let prompt = format!(
                "{}\n\n{}",
                persona_text.trim(),
                render(base, &[("user_input", input)])
            );
            Ok::<_, crate::error::Error>(self.gateway.complete(&prompt).await?)
        }
        .await;

        match result {
            Ok(text) => AgentReply::text(text),
            Err(e) => AgentReply::text(error_reply("coach agent", &e)),
        }
    }
}

#[async_trait]
impl Agent for CoachAgent {
    fn name(&self) -> &'static str {
        "coach"
    }

    async fn handle(&self, input: &str) -> AgentReply {
        let lower = input.to_lowercase();

        if PROGRESS_TRIGGERS.iter().any(|w| lower.contains(w)) {
            if let Some(entry) = extract::parse_progress(input) {
                return self.track_progress(entry).await;
            }
        }

        if LOOKUP_TRIGGERS.iter().any(|w| lower.contains(w)) {
            return self.lookup_technique(input).await;
        }

        self.persona_reply(input).await
    }
}
