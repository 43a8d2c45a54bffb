use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{self, Config};
use crate::credentials::Credentials;
use crate::endpoint::{chat_completions_url, resolve_endpoint};
use crate::error::QwenError;
use crate::providers::http_errors::classify_request_error;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTarget {
    pub endpoint: String,
    access_token: String,
}

impl ApiTarget {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self, QwenError> {
        let access_token = credentials.access_token()?;
        Ok(Self::new(resolve_endpoint(credentials), access_token))
    }
}

/// Single attempt; the deadline is the `client`'s own timeout.
pub async fn chat_completion(
    client: &Client,
    cfg: &Config,
    target: &ApiTarget,
    prompt: &str,
) -> Result<Completion, QwenError> {
    let api_url = chat_completions_url(&target.endpoint);
    let body = ChatCompletionRequest {
        model: &cfg.model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        temperature: cfg.temperature,
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        temperature = cfg.temperature,
        prompt_len = prompt.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, config::USER_AGENT)
        .bearer_auth(&target.access_token)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "chat completion request failed"
            );
            classify_request_error(err, &api_url, cfg.timeout_secs)
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat completion returned non-200 status"
        );
        return Err(QwenError::Status {
            status: status.as_u16(),
            body: response_body,
        });
    }

    let raw = response
        .text()
        .await
        .map_err(|err| classify_request_error(err, &api_url, cfg.timeout_secs))?;
    let completion = parse_completion(&raw)?;
    debug!(
        model = %cfg.model,
        response_len = completion.content.len(),
        "received chat completion"
    );
    Ok(completion)
}

fn parse_completion(raw: &str) -> Result<Completion, QwenError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(raw)
        .map_err(|err| QwenError::InvalidResponse(format!("malformed JSON body: {err}")))?;

    let first = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| QwenError::InvalidResponse("response contained no choices".to_string()))?;
    let content = first.message.content.ok_or_else(|| {
        QwenError::InvalidResponse("first choice has no message content".to_string())
    })?;

    Ok(Completion {
        content,
        usage: parsed.usage,
    })
}
