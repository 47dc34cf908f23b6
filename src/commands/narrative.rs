use eyre::Result;
use std::sync::Arc;

use crate::agent::AgentKind;
use crate::agent::narrative::{CharacterProfile, NarrativeAgent};
use crate::cli::{NarrativeAction, OutputFormat};
use crate::config::Config;

use super::print_result;

pub fn run(action: NarrativeAction, config: Arc<Config>) -> Result<()> {
    let agent = NarrativeAgent::new("narrative", AgentKind::Narrative.default_capabilities(), config);
    log::debug!("Running {}", agent);

    match action {
        NarrativeAction::Generate { topic, style, format } => print_result(
            "generate_narrative",
            &agent.generate_narrative(&topic, &style),
            OutputFormat::resolve(format),
        ),
        NarrativeAction::Adapt {
            content,
            culture,
            format,
        } => print_result(
            "adapt_culturally",
            &agent.adapt_culturally(&content, &culture),
            OutputFormat::resolve(format),
        ),
        NarrativeAction::Cliffhanger { narrative, format } => print_result(
            "create_cliffhanger",
            &agent.create_cliffhanger(&narrative),
            OutputFormat::resolve(format),
        ),
        NarrativeAction::Character {
            narrative,
            name,
            traits,
            background,
            format,
        } => {
            let profile = build_profile(name, traits, background);
            print_result(
                "ensure_character_consistency",
                &agent.ensure_character_consistency(&narrative, profile.as_ref()),
                OutputFormat::resolve(format),
            )
        }
    }
}

/// A custom profile when any profile flag was given
fn build_profile(name: Option<String>, traits: Vec<String>, background: Option<String>) -> Option<CharacterProfile> {
    if name.is_none() && traits.is_empty() && background.is_none() {
        return None;
    }

    let default = CharacterProfile::default();
    Some(CharacterProfile {
        name: name.unwrap_or(default.name),
        traits,
        background: background.unwrap_or_default(),
    })
}
