//! Narrative agent: story text, cultural framing, cliffhangers and character notes

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Agent, AgentCore, AgentKind, GenerationResult, Status, word_count};
use crate::compliance::REJECTION_REASON;
use crate::config::Config;
use crate::provider::openai::{self, ChatRequest};
use crate::provider::{Provider, Transport, UreqTransport};

const SYSTEM_PROMPT: &str =
    "You are an expert creative writer who produces engaging, tasteful fiction for adult readers.";

/// Narrative style families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Erotic,
    Romantic,
    Adventure,
}

impl Style {
    /// Map a style tag to its family. Unrecognized tags use the erotic family.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "romantic" => Style::Romantic,
            "adventure" => Style::Adventure,
            "erotic" => Style::Erotic,
            _ => Style::Erotic,
        }
    }

    /// Completion prompt for `topic`
    pub fn prompt(&self, topic: &str) -> String {
        match self {
            Style::Erotic => format!(
                "Write a tasteful, engaging sensual short story about {}. Focus on tension, longing, and \
                 emotional connection. Keep it sophisticated and avoid explicit language. Aim for 400-600 words.",
                topic
            ),
            Style::Romantic => format!(
                "Write a romantic story about {}. Focus on emotional connection, chemistry, and meaningful \
                 moments. Aim for 400-600 words.",
                topic
            ),
            Style::Adventure => format!(
                "Write an adventure story involving {}. Focus on excitement, discovery, and compelling \
                 characters. Aim for 400-600 words.",
                topic
            ),
        }
    }

    fn placeholder_templates(&self) -> &'static [&'static str] {
        match self {
            Style::Erotic => &[
                "In the neon-lit corridors of the orbital station, {topic} unfolded like a half-remembered dream. \
                 Not even the artificial gravity could hold down the charge that hung in the air...",
                "The {topic} kept secrets only the stars could overhear, and longing flickered in the quiet dark \
                 between them. Her breath fogged the viewport glass as she leaned closer...",
                "Among the {topic}, she felt pulled toward mysteries that ignored both physics and caution. \
                 Whatever bound the two of them rippled outward across every dimension...",
            ],
            Style::Romantic => &[
                "Beneath the soft glow of distant nebulae, {topic} became the backdrop for an unexpected romance. \
                 Time slowed as their eyes met across the observation deck...",
                "The {topic} turned out to be the perfect place for love to take root where no one expected it. \
                 Against every odd, two hearts found each other in the endless dark...",
            ],
            Style::Adventure => &[
                "The {topic} held a secret that would change everything. As the engines hummed awake, the crew \
                 readied themselves for a journey past the edge of the charts...",
                "Deep inside the {topic}, something ancient was waiting to be found. The expedition had no idea \
                 what they were about to uncover...",
            ],
        }
    }

    /// Every placeholder narrative this style can produce for `topic`
    pub fn placeholder_pool(&self, topic: &str) -> Vec<String> {
        self.placeholder_templates()
            .iter()
            .map(|template| template.replace("{topic}", topic))
            .collect()
    }
}

/// Cultural framings for adapted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Culture {
    Universal,
    Western,
    Eastern,
    Latin,
}

impl Culture {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "universal" => Some(Culture::Universal),
            "western" => Some(Culture::Western),
            "eastern" => Some(Culture::Eastern),
            "latin" => Some(Culture::Latin),
            _ => None,
        }
    }

    pub fn apply(&self, content: &str) -> String {
        match self {
            Culture::Universal => content.to_string(),
            Culture::Western => format!("[Western Context] {}", content),
            Culture::Eastern => format!("[Eastern Context] {}", content),
            Culture::Latin => format!("[Latin Context] {}", content),
        }
    }
}

/// Closing hooks appended by [`NarrativeAgent::create_cliffhanger`]
pub const CLIFFHANGERS: [&str; 6] = [
    "But then, the airlock began to open...",
    "Suddenly, the lights went out and she heard footsteps...",
    "The message on her screen changed everything...",
    "A shadow moved in the corridor behind her...",
    "The ship's AI spoke with a voice she didn't recognize...",
    "Her communicator crackled with an impossible transmission...",
];

/// A character whose traits should stay consistent across narratives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub background: String,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            name: "Alex".to_string(),
            traits: vec!["curious".to_string(), "brave".to_string(), "passionate".to_string()],
            background: "space explorer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub narrative: String,
    pub word_count: usize,
    pub topic: String,
    pub style: String,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adaptation {
    pub adapted_content: String,
    pub original_content: String,
    pub target_culture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cliffhanger {
    pub enhanced_narrative: String,
    pub cliffhanger: String,
    pub original_length: usize,
    pub enhanced_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterConsistency {
    pub enhanced_narrative: String,
    pub character_profile: CharacterProfile,
    pub consistency_applied: bool,
}

pub struct NarrativeAgent {
    core: AgentCore,
    transport: Arc<dyn Transport>,
}

impl NarrativeAgent {
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
            core: AgentCore::new(AgentKind::Narrative, name, capabilities, config),
            transport,
        }
    }

    /// Generate story text about `topic` in `style`.
    ///
    /// Uses the OpenAI completion API when an `sk-` key is available and the
    /// placeholder templates otherwise. Live output must pass the compliance
    /// filter.
    pub fn generate_narrative(&self, topic: &str, style: &str) -> GenerationResult<Narrative> {
        let family = Style::from_tag(style);
        let placeholder = || self.placeholder_narrative(topic, style, family);

        let result = match self.core.live_key(Provider::OpenAi) {
            None => placeholder(),
            Some(key) => {
                let settings = self.core.get_model_config("text");
                let request = ChatRequest::new(&settings, SYSTEM_PROMPT, &family.prompt(topic));
                let outcome = openai::complete(
                    self.transport.as_ref(),
                    &key,
                    settings.endpoint.as_deref(),
                    &request,
                );
                self.core.settle(
                    "OpenAI",
                    outcome,
                    |text| self.accept_narrative(text, topic, style, &request.model),
                    placeholder,
                )
            }
        };

        self.core
            .log_action("generate_narrative", &["topic", "style"], result.status());
        result
    }

    fn accept_narrative(&self, text: String, topic: &str, style: &str, model: &str) -> GenerationResult<Narrative> {
        if !self.core.is_compliant(&text) {
            return GenerationResult::failed(REJECTION_REASON);
        }

        GenerationResult::completed(
            Status::Success,
            Narrative {
                word_count: word_count(&text),
                narrative: text,
                topic: topic.to_string(),
                style: style.to_string(),
                model_used: model.to_string(),
            },
        )
    }

    // Selection is random on purpose: repeated calls vary.
    fn placeholder_narrative(&self, topic: &str, style: &str, family: Style) -> GenerationResult<Narrative> {
        let narrative = family
            .placeholder_pool(topic)
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();

        GenerationResult::completed(
            Status::Generated,
            Narrative {
                word_count: word_count(&narrative),
                narrative,
                topic: topic.to_string(),
                style: style.to_string(),
                model_used: "placeholder".to_string(),
            },
        )
    }

    /// Frame `content` for a culture. Unknown culture tags leave it unchanged.
    pub fn adapt_culturally(&self, content: &str, culture: &str) -> GenerationResult<Adaptation> {
        let adapted_content = Culture::from_tag(culture)
            .map(|c| c.apply(content))
            .unwrap_or_else(|| content.to_string());

        let result = GenerationResult::completed(
            Status::Adapted,
            Adaptation {
                adapted_content,
                original_content: content.to_string(),
                target_culture: culture.to_string(),
            },
        );

        self.core.log_action("adapt_culturally", &["culture"], result.status());
        result
    }

    /// Append a randomly chosen closing hook for serialized content
    pub fn create_cliffhanger(&self, narrative: &str) -> GenerationResult<Cliffhanger> {
        let cliffhanger = CLIFFHANGERS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CLIFFHANGERS[0]);
        let enhanced_narrative = format!("{}\n\n{}", narrative, cliffhanger);

        let result = GenerationResult::completed(
            Status::Enhanced,
            Cliffhanger {
                original_length: word_count(narrative),
                enhanced_length: word_count(&enhanced_narrative),
                enhanced_narrative,
                cliffhanger: cliffhanger.to_string(),
            },
        );

        self.core.log_action("create_cliffhanger", &["narrative"], result.status());
        result
    }

    /// Append a character note, using the default profile when none is given
    pub fn ensure_character_consistency(
        &self,
        narrative: &str,
        profile: Option<&CharacterProfile>,
    ) -> GenerationResult<CharacterConsistency> {
        let profile = profile.cloned().unwrap_or_default();
        let enhanced_narrative = format!(
            "{}\n\n[Character Note: {} - {}]",
            narrative,
            profile.name,
            profile.traits.join(", ")
        );

        let result = GenerationResult::completed(
            Status::Consistent,
            CharacterConsistency {
                enhanced_narrative,
                character_profile: profile,
                consistency_applied: true,
            },
        );

        self.core
            .log_action("ensure_character_consistency", &["character"], result.status());
        result
    }
}

impl Agent for NarrativeAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }
}

impl fmt::Display for NarrativeAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.core, f)
    }
}
