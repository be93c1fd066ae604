/*!
 * Remote engine client for OpenAI-compatible chat-completions endpoints.
 *
 * Most hosted and local generative engines expose this wire format; the
 * gateway treats them uniformly through one client parameterized by
 * endpoint, key, and model.
 */

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::EngineError;
use crate::engines::TranslationEngine;

/// Chat message in the request/response body.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model name
    model: String,
    /// Conversation messages
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Client for one remote OpenAI-compatible engine.
#[derive(Debug)]
pub struct RemoteEngine {
    /// Stable engine identifier
    id: String,
    /// HTTP client
    client: Client,
    /// Endpoint base URL (".../v1" style)
    endpoint: String,
    /// API key; may be empty for local servers
    api_key: String,
    /// Model name
    model: String,
}

impl RemoteEngine {
    /// Create a new remote engine client.
    ///
    /// The HTTP client carries no request timeout of its own: the gateway
    /// bounds every dispatch with its configured engine timeout.
    pub fn new(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        // Validate early so a typo fails at construction, not mid-request
        Url::parse(&endpoint)?;

        Ok(Self {
            id: id.into(),
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranslationEngine for RemoteEngine {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, prompt: &str) -> Result<String, EngineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.3),
        };

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        debug!("dispatching to engine {} at {}", self.id, self.endpoint);

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    EngineError::ConnectionError(e.to_string())
                } else {
                    EngineError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!("engine {} returned {}: {}", self.id, status, message);
            return Err(EngineError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| EngineError::ParseError(e.to_string()))?;

        let text = body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(EngineError::EmptyResponse);
        }

        Ok(text)
    }
}
