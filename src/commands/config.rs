use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::{Config, mask_key};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    let config = config.redacted();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Wagon Configuration".bold());
            println!();

            println!("{}:", "api_keys".cyan());
            if config.api_keys.is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            let mut services: Vec<_> = config.api_keys.iter().collect();
            services.sort();
            for (service, key) in services {
                println!("  {}: {}", service, key);
            }
            println!();

            println!("{}:", "models".cyan());
            if config.models.is_empty() {
                println!("  {}", "(none, provider defaults apply)".dimmed());
            }
            let mut models: Vec<_> = config.models.iter().collect();
            models.sort_by(|a, b| a.0.cmp(b.0));
            for (model_type, settings) in models {
                println!("  {}: {}", model_type, serde_json::to_string(settings)?);
            }
            println!();

            println!("{}:", "compliance".cyan());
            println!("  nsfw.enabled: {}", config.compliance.nsfw.enabled);
            println!(
                "  nsfw.content_filters: {}",
                config.compliance.nsfw.content_filters.join(", ")
            );
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => eyre::bail!("Unknown config key: {}", key),
    }
}

/// Resolve a dot-notation key. API keys are always masked.
fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "log_level" | "log-level" => return Some(config.log_level.as_filter().to_string()),
        "compliance.nsfw.enabled" => return Some(config.compliance.nsfw.enabled.to_string()),
        "compliance.nsfw.content_filters" => return Some(config.compliance.nsfw.content_filters.join(",")),
        _ => {}
    }

    if let Some(service) = key.strip_prefix("api_keys.") {
        return config.api_keys.get(service).map(|k| mask_key(k));
    }

    let rest = key.strip_prefix("models.")?;
    let (model_type, field) = rest.split_once('.')?;
    let settings = config.model(model_type)?;
    match field {
        "model" => settings.model.clone(),
        "temperature" => settings.temperature.map(|t| t.to_string()),
        "max_tokens" => settings.max_tokens.map(|t| t.to_string()),
        "steps" => settings.steps.map(|s| s.to_string()),
        "endpoint" => settings.endpoint.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn config() -> Config {
        let mut config = Config::default();
        config.api_keys.insert("openai".to_string(), "sk-secret".to_string());
        config.models.insert(
            "image".to_string(),
            ModelConfig {
                steps: Some(40),
                ..Default::default()
            },
        );
        config
    }

    #[test]
    fn test_lookup_masks_api_keys() {
        assert_eq!(lookup("api_keys.openai", &config()), Some("sk-***".to_string()));
    }

    #[test]
    fn test_lookup_model_field() {
        assert_eq!(lookup("models.image.steps", &config()), Some("40".to_string()));
        assert_eq!(lookup("models.image.model", &config()), None);
        assert_eq!(lookup("models.text.steps", &config()), None);
    }

    #[test]
    fn test_lookup_scalars() {
        assert_eq!(lookup("log_level", &config()), Some("INFO".to_string()));
        assert_eq!(lookup("compliance.nsfw.enabled", &config()), Some("false".to_string()));
        assert_eq!(lookup("nope", &config()), None);
    }
}
