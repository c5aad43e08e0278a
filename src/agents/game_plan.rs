//! Plan agent — tournament game plans from extracted match details.
//!
//! The extraction guard runs first: with any required field missing, the
//! agent asks for the missing details and the gateway is never called.
//! Generated plans are persisted best-effort; a store failure does not fail
//! the reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agents::extract::{extract_tournament_info, TournamentInfo};
use crate::agents::{error_reply, Agent, AgentReply};
use crate::llm::CompletionGateway;
use crate::prompts::{render, PromptStore};
use crate::store::{NewGamePlan, Store};

/// How many previous plans to offer the template as context.
const CONTEXT_PLANS: usize = 2;

/// Plan-generation agent.
pub struct GamePlanAgent {
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptStore>,
    store: Arc<dyn Store>,
    student: String,
}

impl GamePlanAgent {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        prompts: Arc<PromptStore>,
        store: Arc<dyn Store>,
        student: String,
    ) -> Self {
        Self {
            gateway,
            prompts,
            store,
            student,
        }
    }

    /// Previous plans for the student, formatted as optional prompt context.
    async fn plan_context(&self) -> String {
        match self.store.game_plans_for(&self.student, CONTEXT_PLANS).await {
            Ok(plans) if !plans.is_empty() => {
                let mut context = String::from("Previous game plans for this athlete:\n");
                for plan in &plans {
                    context.push_str("---\n");
                    context.push_str(&plan.plan);
                    context.push('\n');
                }
                context
            }
            Ok(_) => String::new(),
            Err(e) => {
                warn!(error = %e, "Could not load previous plans for context");
                String::new()
            }
        }
    }

    async fn build_plan(&self, info: &TournamentInfo) -> Result<String, crate::error::Error> {
        let template = self.prompts.resolve("game_plan")?;
        let context = self.plan_context().await;

        let prompt = render(
            template,
            &[
                ("division", info.division.as_deref().unwrap_or("your division")),
                (
                    "weight_class",
                    info.weight_class.as_deref().unwrap_or("your weight class"),
                ),
                (
                    "opponent_style",
                    info.opponent_style.as_deref().unwrap_or("various styles"),
                ),
                ("gender", info.gender.as_deref().unwrap_or("unspecified")),
                (
                    "no_gi_level",
                    info.no_gi_level.as_deref().unwrap_or("your level"),
                ),
                (
                    "tournament_name",
                    info.tournament_name.as_deref().unwrap_or("the tournament"),
                ),
                ("user_style", "your own style"),
                ("goals", "winning"),
                ("context", context.trim_end()),
            ],
        );

        Ok(self.gateway.complete(&prompt).await?)
    }

    async fn save_plan(&self, info: &TournamentInfo, plan: &str) {
        let new = NewGamePlan {
            student: self.student.clone(),
            tournament_name: info.tournament_name.clone(),
            division: info.division.clone(),
            weight_class: info.weight_class.clone(),
            opponent_style: info.opponent_style.clone(),
            plan: plan.to_string(),
        };
        match self.store.save_game_plan(&new).await {
            Ok(id) => debug!(id, "Game plan saved"),
            Err(e) => warn!(error = %e, "Failed to save game plan"),
        }
    }
}

#[async_trait]
impl Agent for GamePlanAgent {
    fn name(&self) -> &'static str {
        "game_plan"
    }

    async fn handle(&self, input: &str) -> AgentReply {
        let info = extract_tournament_info(input);

        let missing = info.missing_fields();
        if !missing.is_empty() {
            debug!(missing = ?missing, "Plan request incomplete, asking for details");
            return AgentReply::text(format!(
                "I need more information to create a game plan. Please provide: {}",
                missing.join(", ")
            ));
        }

        match self.build_plan(&info).await {
            Ok(plan) => {
                self.save_plan(&info, &plan).await;
                AgentReply::text(plan)
            }
            Err(e) => AgentReply::text(error_reply("game plan agent", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGateway;
    use crate::store::LibSqlStore;

    const FULL_REQUEST: &str = "Tournament prep: blue belt, 155 lbs, male, intermediate no-gi, \
                                aggressive opponent";

    async fn agent_with(gateway: Arc<ScriptedGateway>) -> (GamePlanAgent, Arc<LibSqlStore>) {
        let store = Arc::new(LibSqlStore::open_in_memory().await.unwrap());
        let agent = GamePlanAgent::new(
            gateway,
            Arc::new(PromptStore::builtin()),
            store.clone() as Arc<dyn Store>,
            "alice".into(),
        );
        (agent, store)
    }

    #[tokio::test]
    async fn missing_fields_short_circuit_without_gateway() {
        let gateway = Arc::new(ScriptedGateway::always("should not be called"));
        let (agent, store) = agent_with(gateway.clone()).await;

        let reply = agent.handle("help me prepare for a tournament").await;
        assert!(reply.text.starts_with("I need more information"));
        assert!(reply.text.contains("belt division"));
        assert!(reply.text.contains("weight class"));
        assert_eq!(gateway.calls(), 0);
        assert!(store.game_plans_for("alice", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_request_generates_and_saves_plan() {
        let gateway = Arc::new(ScriptedGateway::always("1. Standing phase: collar ties"));
        let (agent, store) = agent_with(gateway.clone()).await;

        let reply = agent.handle(FULL_REQUEST).await;
        assert_eq!(reply.text, "1. Standing phase: collar ties");
        assert!(reply.subroute.is_none());
        assert_eq!(gateway.calls(), 1);

        let plans = store.game_plans_for("alice", 10).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].division.as_deref(), Some("blue belt"));
        assert_eq!(plans[0].weight_class.as_deref(), Some("155 lbs"));
    }

    #[tokio::test]
    async fn previous_plans_feed_context() {
        let gateway = Arc::new(ScriptedGateway::always("plan text"));
        let (agent, store) = agent_with(gateway.clone()).await;

        store
            .save_game_plan(&NewGamePlan {
                student: "alice".into(),
                tournament_name: None,
                division: Some("blue belt".into()),
                weight_class: Some("155 lbs".into()),
                opponent_style: Some("aggressive".into()),
                plan: "old plan: pull guard early".into(),
            })
            .await
            .unwrap();

        let context = agent.plan_context().await;
        assert!(context.contains("old plan: pull guard early"));
    }

    #[tokio::test]
    async fn gateway_failure_becomes_error_text() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let (agent, store) = agent_with(gateway).await;

        let reply = agent.handle(FULL_REQUEST).await;
        assert!(reply.text.starts_with("Error in game plan agent:"));
        assert!(store.game_plans_for("alice", 10).await.unwrap().is_empty());
    }
}
