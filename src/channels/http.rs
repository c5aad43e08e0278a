//! HTTP channel — axum JSON API.
//!
//! `POST /chat` routes a message; the profile routes read and write the
//! student table so a web front-end can manage profiles.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::channels::Channel;
use crate::error::ChannelError;
use crate::router::{Router, RoutingResult};
use crate::store::{Store, StudentProfile, StudentRecord};

#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    store: Arc<dyn Store>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    input: String,
}

#[derive(Debug, Serialize)]
struct ProfileSaved {
    id: i64,
}

/// HTTP front-end on a local port.
pub struct HttpChannel {
    state: AppState,
    port: u16,
}

impl HttpChannel {
    pub fn new(router: Arc<Router>, store: Arc<dyn Store>, port: u16) -> Self {
        Self {
            state: AppState { router, store },
            port,
        }
    }
}

fn app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/chat", post(chat))
        .route("/profile", post(upsert_profile))
        .route("/profile/{name}", get(get_profile))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<RoutingResult> {
    Json(state.router.route(&request.input).await)
}

async fn upsert_profile(
    State(state): State<AppState>,
    Json(profile): Json<StudentProfile>,
) -> Result<Json<ProfileSaved>, StatusCode> {
    if profile.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.store.upsert_student(&profile).await {
        Ok(id) => Ok(Json(ProfileSaved { id })),
        Err(e) => {
            error!(error = %e, "Profile upsert failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StudentRecord>, StatusCode> {
    match state.store.get_student(&name).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(error = %e, "Profile lookup failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[async_trait]
impl Channel for HttpChannel {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn serve(&self) -> Result<(), ChannelError> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener =
            tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| ChannelError::StartupFailed {
                    name: "http".into(),
                    reason: format!("could not bind {addr}: {e}"),
                })?;
        info!(addr = %addr, "HTTP channel listening");

        axum::serve(listener, app(self.state.clone()))
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "http".into(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{CoachAgent, GamePlanAgent, Persona, RecoveryAgent};
    use crate::llm::testing::ScriptedGateway;
    use crate::llm::CompletionGateway;
    use crate::prompts::PromptStore;
    use crate::router::Classifier;
    use crate::store::LibSqlStore;

    async fn start_server(gateway: Arc<ScriptedGateway>) -> (u16, Arc<LibSqlStore>) {
        let store = Arc::new(LibSqlStore::open_in_memory().await.unwrap());
        let prompts = Arc::new(PromptStore::builtin());
        let gw: Arc<dyn CompletionGateway> = gateway;

        let router = Arc::new(Router::new(
            Classifier::new(gw.clone(), prompts.clone()),
            Arc::new(CoachAgent::new(
                gw.clone(),
                prompts.clone(),
                store.clone() as Arc<dyn Store>,
                Persona::James,
                "alice".into(),
            )),
            Arc::new(GamePlanAgent::new(
                gw.clone(),
                prompts.clone(),
                store.clone() as Arc<dyn Store>,
                "alice".into(),
            )),
            Arc::new(RecoveryAgent::new(gw, prompts)),
        ));

        let state = AppState {
            router,
            store: store.clone() as Arc<dyn Store>,
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        (port, store)
    }

    #[tokio::test]
    async fn chat_route_returns_routing_result() {
        let gateway = Arc::new(ScriptedGateway::always("see a physio").push_reply("injury"));
        let (port, _) = start_server(gateway).await;

        let client = reqwest::Client::new();
        let body: serde_json::Value = client
            .post(format!("http://127.0.0.1:{port}/chat"))
            .json(&serde_json::json!({"input": "my knee hurts"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["category"], "wellness");
        assert_eq!(body["output"], "see a physio");
        assert!(body["subroute"].is_null());
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let gateway = Arc::new(ScriptedGateway::always("unused"));
        let (port, _) = start_server(gateway).await;
        let client = reqwest::Client::new();

        let saved: serde_json::Value = client
            .post(format!("http://127.0.0.1:{port}/profile"))
            .json(&serde_json::json!({"name": "bob", "belt": "blue", "age": 30}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(saved["id"].as_i64().unwrap() > 0);

        let fetched: serde_json::Value = client
            .get(format!("http://127.0.0.1:{port}/profile/bob"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched["name"], "bob");
        assert_eq!(fetched["belt"], "blue");
    }

    #[tokio::test]
    async fn unknown_profile_is_404() {
        let gateway = Arc::new(ScriptedGateway::always("unused"));
        let (port, _) = start_server(gateway).await;

        let status = reqwest::get(format!("http://127.0.0.1:{port}/profile/nobody"))
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 404);
    }

    #[tokio::test]
    async fn empty_profile_name_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::always("unused"));
        let (port, _) = start_server(gateway).await;

        let status = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/profile"))
            .json(&serde_json::json!({"name": "  "}))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 400);
    }
}
