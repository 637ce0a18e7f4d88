//! Hosted chat-completions client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use opd_dashboard_core::config::InferenceConfig;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::SYSTEM_INSTRUCTION;

/// Inference errors.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Cannot reach inference service at {0}")]
    Connection(String),

    #[error("Inference request failed: {0}")]
    Http(String),

    #[error("Inference service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Cannot parse inference response: {0}")]
    ResponseParsing(String),

    #[error("Inference response contained no choices")]
    EmptyResponse,
}

pub type InferenceResult<T> = Result<T, InferenceError>;

/// Text generation from a single prompt.
pub trait InferenceClient {
    fn generate(&self, prompt: &str) -> InferenceResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(config: &InferenceConfig) -> InferenceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

impl InferenceClient for OpenAiClient {
    fn generate(&self, prompt: &str) -> InferenceResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "Requesting OPD summary");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    InferenceError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    InferenceError::Http(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    InferenceError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Inference request rejected");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| InferenceError::ResponseParsing(e.to_string()))?;
        parse_chat_response(&body)
    }
}

/// Content of the first choice. A missing `content` reads as empty text.
fn parse_chat_response(body: &str) -> InferenceResult<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::ResponseParsing(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or(InferenceError::EmptyResponse)
}

/// Mock client for testing. Returns a fixed reply and records prompts.
pub struct MockInferenceClient {
    response: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockInferenceClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl InferenceClient for MockInferenceClient {
    fn generate(&self, prompt: &str) -> InferenceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.response.clone())
    }
}
