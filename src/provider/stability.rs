//! Stability AI text-to-image endpoint

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CallOutcome, Provider, ProviderRequest, Transport, base_url, call};
use crate::config::ModelConfig;

pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";
pub const DEFAULT_STEPS: u32 = 20;
pub const CFG_SCALE: u32 = 7;
pub const IMAGE_SIZE: u32 = 1024;

/// Always sent with weight -1
pub const NEGATIVE_PROMPT: &str = "nsfw, explicit, underage, violence";

#[derive(Debug, Clone, Serialize)]
pub struct TextToImageRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: u32,
    pub height: u32,
    pub width: u32,
    pub samples: u32,
    pub steps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

impl TextToImageRequest {
    pub fn new(settings: &ModelConfig, prompt: &str) -> Self {
        Self {
            text_prompts: vec![
                TextPrompt {
                    text: prompt.to_string(),
                    weight: 1.0,
                },
                TextPrompt {
                    text: NEGATIVE_PROMPT.to_string(),
                    weight: -1.0,
                },
            ],
            cfg_scale: CFG_SCALE,
            height: IMAGE_SIZE,
            width: IMAGE_SIZE,
            samples: 1,
            steps: settings.steps.unwrap_or(DEFAULT_STEPS),
        }
    }
}

/// One generated image
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub base64: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    artifacts: Vec<Artifact>,
}

/// Engine id from settings or the SDXL default
pub fn engine(settings: &ModelConfig) -> &str {
    settings.model.as_deref().unwrap_or(DEFAULT_ENGINE)
}

/// Generate an image and return the first artifact
pub fn text_to_image(
    transport: &dyn Transport,
    api_key: &str,
    settings: &ModelConfig,
    request: &TextToImageRequest,
) -> CallOutcome<Artifact> {
    let body = match serde_json::to_value(request).context("Failed to serialize image request") {
        Ok(body) => body,
        Err(e) => return CallOutcome::TransportFault(e),
    };

    let request = ProviderRequest {
        url: format!(
            "{}/v1/generation/{}/text-to-image",
            base_url(Provider::StableDiffusion, settings.endpoint.as_deref()),
            engine(settings)
        ),
        api_key: api_key.to_string(),
        accept: "application/json",
        body,
        timeout: IMAGE_TIMEOUT,
    };

    call(transport, &request, parse_artifact)
}

fn parse_artifact(body: &[u8]) -> Result<Artifact> {
    let response: TextToImageResponse = serde_json::from_slice(body).context("Failed to parse image response")?;
    response
        .artifacts
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("No artifacts in image response"))
}
