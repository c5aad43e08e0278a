//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::llm::retry::with_retry;
use crate::llm::CompletionGateway;

/// Completion gateway over an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiGateway {
    /// Build a gateway from explicit configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed {
                endpoint: config.endpoint.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    async fn complete_once(&self, prompt: &str) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.config.timeout)
                } else {
                    GatewayError::RequestFailed {
                        endpoint: self.config.endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".into()))?;

        debug!(model = %self.config.model, chars = content.len(), "Completion received");
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        with_retry(self.config.max_retries, || self.complete_once(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".into(),
            api_key: secrecy::SecretString::from("test-key"),
            model: "gpt-4o".into(),
            timeout: Duration::from_millis(200),
            max_retries: 0,
        }
    }

    #[test]
    fn gateway_construction() {
        let gateway = OpenAiGateway::new(test_config()).unwrap();
        assert_eq!(gateway.model_name(), "gpt-4o");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_gateway_error() {
        // Port 9 (discard) — nothing listens there; the send fails fast.
        let gateway = OpenAiGateway::new(test_config()).unwrap();
        let err = gateway.complete("hello").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::RequestFailed { .. } | GatewayError::Timeout(_)
        ));
    }

    #[test]
    fn response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"  coach \n"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(content.trim(), "coach");
    }
}
