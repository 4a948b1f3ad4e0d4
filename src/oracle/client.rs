//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt;
use super::{ExplainOracle, ExplainRequest, OracleError, OracleResult, PlanOracle};
use crate::config::OracleSettings;

const PLAN_TEMPERATURE: f32 = 0.0;
const EXPLAIN_TEMPERATURE: f32 = 0.2;
const DESCRIBE_TEMPERATURE: f32 = 0.1;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Chat-completions client that serves as both plan and explanation oracle.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from settings, expanding the API key from the environment.
    pub fn from_settings(settings: &OracleSettings) -> OracleResult<Self> {
        let api_key = settings
            .resolved_api_key()
            .map_err(|_| OracleError::MissingApiKey)?;
        Ok(Self::new(&settings.base_url, &settings.model, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> OracleResult<String> {
        if self.api_key.trim().is_empty() {
            return Err(OracleError::MissingApiKey);
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        debug!(model = %self.model, temperature, "sending chat completion");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OracleError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| OracleError::InvalidResponse("response has no message content".into()))
    }
}

#[async_trait]
impl PlanOracle for ChatClient {
    async fn generate_plan(&self, columns: &[String], question: &str) -> OracleResult<String> {
        let user = prompt::plan_user_prompt(columns, question);
        self.complete(prompt::PLANNER_SYSTEM, &user, PLAN_TEMPERATURE)
            .await
    }
}

#[async_trait]
impl ExplainOracle for ChatClient {
    async fn explain(&self, request: &ExplainRequest) -> OracleResult<String> {
        let user = prompt::explain_user_prompt(request)?;
        self.complete(prompt::ANALYST_SYSTEM, &user, EXPLAIN_TEMPERATURE)
            .await
    }

    async fn describe_dataset(&self, columns: &[String]) -> OracleResult<String> {
        let user = prompt::describe_user_prompt(columns)?;
        self.complete(prompt::ANALYST_SYSTEM, &user, DESCRIBE_TEMPERATURE)
            .await
    }
}
