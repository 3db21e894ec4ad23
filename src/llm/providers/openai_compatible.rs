//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! All OpenAI wire types are private to this module; callers only see
//! [`CompletionRequest`] and the reply text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{CompletionRequest, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// When present the key is sent as `Authorization: Bearer <key>` on
    /// every request.
    pub fn new(
        api_base_url: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, api_key })
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    /// One round-trip. Returns the trimmed content of the first choice.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &request.model,
            messages: vec![Message { role: "user", content: &request.prompt }],
            temperature: request.temperature,
            response_format: request.json_object.then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(
            model = %payload.model,
            temperature = ?payload.temperature,
            json_object = request.json_object,
            content_len = request.prompt.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received LLM response");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(response = %json, "full LLM response payload");
        }

        // Empty content is passed through; the caller decides what that means.
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = describe_error(status, &body);
    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}
