//! Assembly agent: images, audio, packaging and watermark annotation

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::{Agent, AgentCore, AgentKind, GenerationResult, Status};
use crate::config::Config;
use crate::provider::openai::{self, SpeechRequest};
use crate::provider::stability::{self, TextToImageRequest};
use crate::provider::{Provider, Transport, UreqTransport};

pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_WATERMARK: &str = "WagonX";

/// Order is fixed regardless of package inputs
pub const CONTENT_ELEMENTS: [&str; 3] = ["narrative", "image", "audio"];

const IMAGE_DIMENSIONS: &str = "1024x1024";
const DATA_URL_PREVIEW_CHARS: usize = 50;

/// Image style families and their prompt enhancements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    Realistic,
    Anime,
    Fantasy,
    SciFi,
    Erotic,
}

impl ImageStyle {
    /// Unrecognized tags use the realistic enhancement
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "anime" => ImageStyle::Anime,
            "fantasy" => ImageStyle::Fantasy,
            "sci-fi" => ImageStyle::SciFi,
            "erotic" => ImageStyle::Erotic,
            "realistic" => ImageStyle::Realistic,
            _ => ImageStyle::Realistic,
        }
    }

    pub fn enhancement(&self) -> &'static str {
        match self {
            ImageStyle::Realistic => "photorealistic, high detail, 8k",
            ImageStyle::Anime => "anime style, vibrant colors, expressive characters",
            ImageStyle::Fantasy => "fantasy art, epic, detailed, magical atmosphere",
            ImageStyle::SciFi => "sci-fi concept art, futuristic, sleek design",
            ImageStyle::Erotic => "tasteful sensual art, intimate, soft lighting",
        }
    }

    pub fn enhance(&self, prompt: &str) -> String {
        format!("{}, {}", prompt, self.enhancement())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub image_url: String,
    pub prompt: String,
    pub style: String,
    pub dimensions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Audio {
    pub audio_url: String,
    pub text_length: usize,
    pub voice: String,
    pub format: String,
    pub model_used: String,
}

/// Optional descriptive fields for [`AssemblyAgent::package_content`]
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    pub title: Option<String>,
    pub style: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageMetadata {
    pub style: String,
    pub topic: String,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackagedContent {
    pub title: String,
    pub narrative_text: String,
    pub visual_element: String,
    pub audio_element: String,
    pub metadata: PackageMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub packaged_content: PackagedContent,
    pub content_elements: Vec<String>,
    pub package_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Watermark {
    pub watermarked_image_url: String,
    pub original_image_url: String,
    pub watermark_text: String,
}

pub struct AssemblyAgent {
    core: AgentCore,
    transport: Arc<dyn Transport>,
}

impl AssemblyAgent {
    pub fn new(name: impl Into<String>, capabilities: Vec<String>, config: Arc<Config>) -> Self {
        Self::with_transport(name, capabilities, config, Arc::new(UreqTransport))
    }

    pub fn with_transport(
        name: impl Into<String>,
        capabilities: Vec<String>,
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Assembly, name, capabilities, config),
            transport,
        }
    }

    /// Generate an image for `prompt` through Stability, or a placeholder
    /// photo URL keyed by the prompt
    pub fn generate_image(&self, prompt: &str, style: &str) -> GenerationResult<Image> {
        let placeholder = || placeholder_image(prompt, style);

        let result = match self.core.live_key(Provider::StableDiffusion) {
            None => placeholder(),
            Some(key) => {
                let settings = self.core.get_model_config("image");
                let enhanced = ImageStyle::from_tag(style).enhance(prompt);
                let request = TextToImageRequest::new(&settings, &enhanced);
                let outcome = stability::text_to_image(self.transport.as_ref(), &key, &settings, &request);
                self.core.settle(
                    "Stable Diffusion",
                    outcome,
                    |artifact| {
                        GenerationResult::completed(
                            Status::Generated,
                            Image {
                                image_url: data_url("image/png", &artifact.base64),
                                prompt: enhanced.clone(),
                                style: style.to_string(),
                                dimensions: IMAGE_DIMENSIONS.to_string(),
                                seed: artifact.seed,
                                model_used: stability::engine(&settings).to_string(),
                            },
                        )
                    },
                    placeholder,
                )
            }
        };

        self.core.log_action("generate_image", &["prompt", "style"], result.status());
        result
    }

    /// Synthesize speech for `text` through OpenAI, or a placeholder file
    /// name keyed by the text
    pub fn synthesize_audio(&self, text: &str, voice: &str) -> GenerationResult<Audio> {
        let placeholder = || placeholder_audio(text, voice);

        let result = match self.core.live_key(Provider::OpenAi) {
            None => placeholder(),
            Some(key) => {
                let settings = self.core.get_model_config("tts");
                let request = SpeechRequest::new(&settings, text, voice);
                let outcome = openai::synthesize(
                    self.transport.as_ref(),
                    &key,
                    settings.endpoint.as_deref(),
                    &request,
                );
                self.core.settle(
                    "OpenAI TTS",
                    outcome,
                    |bytes| {
                        GenerationResult::completed(
                            Status::Synthesized,
                            Audio {
                                audio_url: data_url("audio/mp3", &STANDARD.encode(bytes)),
                                text_length: text.chars().count(),
                                voice: voice.to_string(),
                                format: request.response_format.clone(),
                                model_used: request.model.clone(),
                            },
                        )
                    },
                    placeholder,
                )
            }
        };

        self.core.log_action("synthesize_audio", &["text", "voice"], result.status());
        result
    }

    /// Bundle narrative, image and audio references into one package
    pub fn package_content(
        &self,
        narrative: &str,
        image_url: &str,
        audio_url: &str,
        options: &PackageOptions,
    ) -> GenerationResult<Package> {
        let packaged_content = PackagedContent {
            title: options.title.clone().unwrap_or_else(|| "Untitled Content".to_string()),
            narrative_text: narrative.to_string(),
            visual_element: image_url.to_string(),
            audio_element: audio_url.to_string(),
            metadata: PackageMetadata {
                style: options.style.clone().unwrap_or_else(|| "unknown".to_string()),
                topic: options.topic.clone().unwrap_or_else(|| "unknown".to_string()),
                creation_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            },
        };

        let result = GenerationResult::completed(
            Status::Packaged,
            Package {
                packaged_content,
                content_elements: CONTENT_ELEMENTS.iter().map(|e| e.to_string()).collect(),
                package_format: "json".to_string(),
            },
        );

        self.core
            .log_action("package_content", &["narrative", "image_url", "audio_url"], result.status());
        result
    }

    /// Annotate an image reference with a watermark query parameter.
    /// No pixels are touched.
    pub fn add_watermark(&self, image_url: &str, watermark_text: &str) -> GenerationResult<Watermark> {
        let result = GenerationResult::completed(
            Status::Watermarked,
            Watermark {
                watermarked_image_url: format!("{}?watermark={}", image_url, watermark_text.replace(' ', "_")),
                original_image_url: image_url.to_string(),
                watermark_text: watermark_text.to_string(),
            },
        );

        self.core.log_action("add_watermark", &["text"], result.status());
        result
    }
}

impl Agent for AssemblyAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }
}

impl fmt::Display for AssemblyAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.core, f)
    }
}

fn placeholder_image(prompt: &str, style: &str) -> GenerationResult<Image> {
    GenerationResult::completed(
        Status::Generated,
        Image {
            image_url: format!(
                "https://picsum.photos/1024/1024?random={}",
                placeholder_id(prompt, 10_000)
            ),
            prompt: prompt.to_string(),
            style: style.to_string(),
            dimensions: IMAGE_DIMENSIONS.to_string(),
            seed: None,
            model_used: "placeholder".to_string(),
        },
    )
}

fn placeholder_audio(text: &str, voice: &str) -> GenerationResult<Audio> {
    GenerationResult::completed(
        Status::Synthesized,
        Audio {
            audio_url: format!("placeholder_audio_{}.mp3", placeholder_id(text, 1_000)),
            text_length: text.chars().count(),
            voice: voice.to_string(),
            format: openai::SPEECH_FORMAT.to_string(),
            model_used: "placeholder".to_string(),
        },
    )
}

/// Stable identifier in `0..modulus` derived from `input`
pub(crate) fn placeholder_id(input: &str, modulus: u64) -> u64 {
    let digest = blake3::hash(input.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head) % modulus
}

/// Truncated data URL; generated media is not stored
fn data_url(mime: &str, base64: &str) -> String {
    let preview: String = base64.chars().take(DATA_URL_PREVIEW_CHARS).collect();
    format!("data:{};base64,{}...", mime, preview)
}
