//! OpenAI chat completion and speech endpoints

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CallOutcome, Provider, ProviderRequest, Transport, base_url, call};
use crate::config::ModelConfig;

pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);
pub const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f64 = 0.9;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";
pub const SPEECH_FORMAT: &str = "mp3";

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatRequest {
    /// System + user exchange using the settings' model parameters or defaults
    pub fn new(settings: &ModelConfig, system: &str, user: &str) -> Self {
        Self {
            model: settings.model.clone().unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
}

impl SpeechRequest {
    pub fn new(settings: &ModelConfig, input: &str, voice: &str) -> Self {
        Self {
            model: settings.model.clone().unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            input: input.to_string(),
            voice: voice.to_string(),
            response_format: SPEECH_FORMAT.to_string(),
        }
    }
}

/// Run a chat completion and return the first choice's content
pub fn complete(
    transport: &dyn Transport,
    api_key: &str,
    endpoint: Option<&str>,
    request: &ChatRequest,
) -> CallOutcome<String> {
    let body = match serde_json::to_value(request).context("Failed to serialize chat request") {
        Ok(body) => body,
        Err(e) => return CallOutcome::TransportFault(e),
    };

    let request = ProviderRequest {
        url: format!("{}/v1/chat/completions", base_url(Provider::OpenAi, endpoint)),
        api_key: api_key.to_string(),
        accept: "application/json",
        body,
        timeout: CHAT_TIMEOUT,
    };

    call(transport, &request, parse_chat)
}

fn parse_chat(body: &[u8]) -> Result<String> {
    let response: ChatResponse = serde_json::from_slice(body).context("Failed to parse chat response")?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| eyre::eyre!("No choices in chat response"))
}

/// Synthesize speech and return the raw audio bytes
pub fn synthesize(
    transport: &dyn Transport,
    api_key: &str,
    endpoint: Option<&str>,
    request: &SpeechRequest,
) -> CallOutcome<Vec<u8>> {
    let body = match serde_json::to_value(request).context("Failed to serialize speech request") {
        Ok(body) => body,
        Err(e) => return CallOutcome::TransportFault(e),
    };

    let request = ProviderRequest {
        url: format!("{}/v1/audio/speech", base_url(Provider::OpenAi, endpoint)),
        api_key: api_key.to_string(),
        accept: "audio/mpeg",
        body,
        timeout: SPEECH_TIMEOUT,
    };

    call(transport, &request, |bytes| {
        if bytes.is_empty() {
            eyre::bail!("Empty audio response");
        }
        Ok(bytes.to_vec())
    })
}
