//! The routing core.
//!
//! One request flows `Start → Classified → Dispatched → Done`: classify the
//! input, select the one agent that owns the category, invoke it, normalize
//! the outcome. `route()` holds no state across calls and never fails — the
//! classifier and the agents each absorb their own faults, so every path
//! through the machine ends in `Done` with displayable text.

mod classifier;

pub use classifier::{Category, Classifier};

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::agents::{Agent, AgentReply};

/// A request entering the router. Immutable once created.
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    pub id: Uuid,
    pub input: String,
}

impl RoutingRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            input: input.into(),
        }
    }
}

/// The normalized outcome of one routed request.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    /// Displayable reply text (possibly an `Error …` message).
    pub output: String,
    /// The category of the agent that produced `output`.
    pub category: Category,
    /// Subroute taken inside the agent, when it re-delegated internally.
    pub subroute: Option<String>,
}

/// Router states. Each transition consumes the previous state.
enum RouteState {
    Start {
        request: RoutingRequest,
    },
    Classified {
        request: RoutingRequest,
        decision: Category,
    },
    Dispatched {
        decision: Category,
        reply: AgentReply,
    },
    Done {
        result: RoutingResult,
    },
}

/// The router — classifier plus one agent per category.
pub struct Router {
    classifier: Classifier,
    coach: Arc<dyn Agent>,
    game_plan: Arc<dyn Agent>,
    recovery: Arc<dyn Agent>,
}

impl Router {
    pub fn new(
        classifier: Classifier,
        coach: Arc<dyn Agent>,
        game_plan: Arc<dyn Agent>,
        recovery: Arc<dyn Agent>,
    ) -> Self {
        Self {
            classifier,
            coach,
            game_plan,
            recovery,
        }
    }

    /// Pure lookup from category to agent. The classifier guarantees a valid
    /// category, so there is no fallthrough here.
    fn select(&self, category: Category) -> &dyn Agent {
        match category {
            Category::Technique => self.coach.as_ref(),
            Category::Plan => self.game_plan.as_ref(),
            Category::Wellness => self.recovery.as_ref(),
        }
    }

    /// Route one request. Always terminates; never fails.
    pub async fn route(&self, input: &str) -> RoutingResult {
        let mut state = RouteState::Start {
            request: RoutingRequest::new(input),
        };

        loop {
            state = match state {
                RouteState::Start { request } => {
                    let decision = self.classifier.classify(&request.input).await;
                    RouteState::Classified { request, decision }
                }
                RouteState::Classified { request, decision } => {
                    let agent = self.select(decision);
                    debug!(request = %request.id, agent = agent.name(), category = %decision, "Dispatching");
                    let reply = agent.handle(&request.input).await;
                    RouteState::Dispatched { decision, reply }
                }
                RouteState::Dispatched { decision, reply } => {
                    let output = if reply.text.trim().is_empty() {
                        format!("Error in {decision} agent: empty response")
                    } else {
                        reply.text
                    };
                    RouteState::Done {
                        result: RoutingResult {
                            output,
                            category: decision,
                            subroute: reply.subroute.map(String::from),
                        },
                    }
                }
                RouteState::Done { result } => return result,
            };
        }
    }
}
