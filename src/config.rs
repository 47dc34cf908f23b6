use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main wagon configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// API keys by service name (e.g. `openai`, `stable_diffusion`)
    pub api_keys: HashMap<String, String>,
    /// Model settings by model type (`text`, `image`, `tts`)
    pub models: HashMap<String, ModelConfig>,
    pub compliance: ComplianceConfig,
    pub log_level: LogLevel,
}

/// Per-model-type provider settings. Unset fields fall back to provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    /// Base URL override for the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub nsfw: NsfwConfig,
}

/// Substring filter settings. Disabled unless explicitly enabled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NsfwConfig {
    pub enabled: bool,
    pub content_filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Where a resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    Config,
    Env,
    DotEnv,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Config => write!(f, "config"),
            KeySource::Env => write!(f, "environment"),
            KeySource::DotEnv => write!(f, ".env"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("WAGON_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => log::warn!("Failed to load config from WAGON_CONFIG: {}", e),
                }
            }
        }

        let mut candidates = vec![Self::wagon_dir().join("wagon.yaml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("wagon").join("wagon.yaml"));
        }
        // For development
        candidates.push(PathBuf::from("wagon.yaml"));

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {}: {}", path.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the wagon directory (config file and `.env` live here)
    pub fn wagon_dir() -> PathBuf {
        std::env::var("WAGON_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("wagon"))
    }

    /// Environment variable consulted for a service's key
    pub fn key_env_var(service: &str) -> String {
        format!("{}_API_KEY", service.to_uppercase())
    }

    /// Resolve an API key: config map, then environment, then `<wagon_dir>/.env`.
    /// Empty values count as missing.
    pub fn resolve_api_key(&self, service: &str) -> Option<(String, KeySource)> {
        self.resolve_api_key_with(service, |name| std::env::var(name).ok())
    }

    /// [`Config::resolve_api_key`] with the environment read through `env`
    pub fn resolve_api_key_with(
        &self,
        service: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<(String, KeySource)> {
        if let Some(key) = self.api_keys.get(service).filter(|k| !k.is_empty()) {
            return Some((key.clone(), KeySource::Config));
        }

        let env_var = Self::key_env_var(service);
        if let Some(key) = env(&env_var)
            && !key.is_empty()
        {
            return Some((key, KeySource::Env));
        }

        let env_file = Self::wagon_dir().join(".env");
        let content = fs::read_to_string(&env_file).ok()?;
        dotenv_value(&content, &env_var).map(|key| (key, KeySource::DotEnv))
    }

    pub fn model(&self, model_type: &str) -> Option<&ModelConfig> {
        self.models.get(model_type)
    }

    /// Copy of this config with every API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for key in config.api_keys.values_mut() {
            *key = mask_key(key);
        }
        config
    }
}

/// Look up `name` in `.env` style content
pub fn dotenv_value(content: &str, name: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && key.trim() == name
        {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}

/// Keep the first three characters of a key and hide the rest
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(3).collect();
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_keys.is_empty());
        assert!(config.models.is_empty());
        assert!(!config.compliance.nsfw.enabled);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
api_keys:
  openai: sk-abc
models:
  text:
    model: gpt-4o
    temperature: 0.5
  image:
    steps: 30
compliance:
  nsfw:
    enabled: true
    content_filters: ["forbidden"]
log_level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("Failed to parse");
        assert_eq!(config.api_keys.get("openai").map(String::as_str), Some("sk-abc"));
        assert_eq!(config.model("text").and_then(|m| m.model.as_deref()), Some("gpt-4o"));
        assert_eq!(config.model("image").and_then(|m| m.steps), Some(30));
        assert!(config.compliance.nsfw.enabled);
        assert_eq!(config.compliance.nsfw.content_filters, vec!["forbidden".to_string()]);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("api_keys: {}\n").expect("Failed to parse");
        assert!(!config.compliance.nsfw.enabled);
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_key_env_var() {
        assert_eq!(Config::key_env_var("openai"), "OPENAI_API_KEY");
        assert_eq!(Config::key_env_var("stable_diffusion"), "STABLE_DIFFUSION_API_KEY");
    }

    fn env_with(name: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |var| (var == name).then(|| value.to_string())
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let mut config = Config::default();
        config
            .api_keys
            .insert("wagon_cfg_test".to_string(), "from-config".to_string());
        let resolved = config.resolve_api_key_with("wagon_cfg_test", env_with("WAGON_CFG_TEST_API_KEY", "from-env"));
        assert_eq!(resolved, Some(("from-config".to_string(), KeySource::Config)));
    }

    #[test]
    fn test_resolve_api_key_empty_config_falls_back_to_env() {
        let mut config = Config::default();
        config.api_keys.insert("wagon_env_test".to_string(), String::new());
        let resolved = config.resolve_api_key_with("wagon_env_test", env_with("WAGON_ENV_TEST_API_KEY", "from-env"));
        assert_eq!(resolved, Some(("from-env".to_string(), KeySource::Env)));
    }

    #[test]
    fn test_resolve_api_key_empty_env_is_missing() {
        let config = Config::default();
        let resolved = config.resolve_api_key_with("wagon_blank_test", env_with("WAGON_BLANK_TEST_API_KEY", ""));
        assert!(resolved.is_none());
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let config = Config::default();
        assert!(config.resolve_api_key("wagon_missing_test").is_none());
    }

    #[test]
    fn test_dotenv_value() {
        let content = "# comment\nOPENAI_API_KEY=\"sk-quoted\"\nOTHER = 'x'\nEMPTY=\n";
        assert_eq!(dotenv_value(content, "OPENAI_API_KEY"), Some("sk-quoted".to_string()));
        assert_eq!(dotenv_value(content, "OTHER"), Some("x".to_string()));
        assert_eq!(dotenv_value(content, "EMPTY"), None);
        assert_eq!(dotenv_value(content, "MISSING"), None);
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut config = Config::default();
        config.api_keys.insert("openai".to_string(), "sk-secret".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.api_keys.get("openai").map(String::as_str), Some("sk-***"));
        assert_eq!(config.api_keys.get("openai").map(String::as_str), Some("sk-secret"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.models.insert(
            "tts".to_string(),
            ModelConfig {
                model: Some("tts-1-hd".to_string()),
                ..Default::default()
            },
        );
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.models.get("tts"), config.models.get("tts"));
    }
}
