//! Report which providers would run live and which fall back to placeholders

use colored::*;
use eyre::Result;
use std::sync::Arc;

use crate::agent::assembly::AssemblyAgent;
use crate::agent::compliance::ComplianceAgent;
use crate::agent::narrative::NarrativeAgent;
use crate::agent::{Agent, AgentKind};
use crate::config::{Config, mask_key};
use crate::provider::Provider;

/// How a provider will be reached
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Live { masked: String, source: String },
    Malformed { source: String },
    Placeholder,
}

fn route(provider: Provider, config: &Config) -> Route {
    match config.resolve_api_key(provider.service()) {
        Some((key, source)) if provider.accepts_key(&key) => Route::Live {
            masked: mask_key(&key),
            source: source.to_string(),
        },
        Some((_, source)) => Route::Malformed {
            source: source.to_string(),
        },
        None => Route::Placeholder,
    }
}

pub fn run(config: Arc<Config>) -> Result<()> {
    println!("{}", "Wagon Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let wagon_dir = Config::wagon_dir();
    let config_file = wagon_dir.join("wagon.yaml");
    if config_file.exists() {
        println!("{} Config file: {}", "✓".green(), config_file.display());
    } else {
        println!("{} Config file missing: {} (defaults in use)", "⚠".yellow(), config_file.display());
    }
    println!();

    println!("{}", "Providers:".bold());
    for provider in Provider::ALL {
        let env_var = Config::key_env_var(provider.service());
        match route(provider, &config) {
            Route::Live { masked, source } => {
                println!("  {} {} live ({} from {})", "✓".green(), provider.name(), masked, source);
            }
            Route::Malformed { source } => {
                println!(
                    "  {} {} key from {} is malformed, placeholder in use",
                    "⚠".yellow(),
                    provider.name(),
                    source
                );
            }
            Route::Placeholder => {
                println!(
                    "  {} {} placeholder (set api_keys.{} or {})",
                    "○".dimmed(),
                    provider.name(),
                    provider.service(),
                    env_var.cyan()
                );
            }
        }
    }
    println!();

    let compliance = &config.compliance.nsfw;
    if compliance.enabled {
        println!(
            "{} Compliance filter enabled ({} terms)",
            "✓".green(),
            compliance.content_filters.len()
        );
    } else {
        println!("{} Compliance filter disabled", "○".dimmed());
    }
    println!();

    let agents: Vec<Box<dyn Agent>> = vec![
        Box::new(NarrativeAgent::new(
            "narrative",
            AgentKind::Narrative.default_capabilities(),
            config.clone(),
        )),
        Box::new(AssemblyAgent::new(
            "assembly",
            AgentKind::Assembly.default_capabilities(),
            config.clone(),
        )),
        Box::new(ComplianceAgent::new(
            "compliance",
            AgentKind::Compliance.default_capabilities(),
            config,
        )),
    ];

    println!("{}", "Agents:".bold());
    for agent in &agents {
        println!("  {} {}", "●".green(), agent.name().bold());
        println!("    {}", agent.capabilities().join(", ").dimmed());
    }

    Ok(())
}
