use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::agent::assembly::{DEFAULT_VOICE, DEFAULT_WATERMARK};

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "wagon",
    about = "Content-generation agents for narrative, image and audio packages",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/wagon/logs/wagon.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to wagon.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and shape story text
    Narrative {
        #[command(subcommand)]
        action: NarrativeAction,
    },

    /// Generate images and audio, package and watermark content
    Assembly {
        #[command(subcommand)]
        action: AssemblyAction,
    },

    /// Check content against the configured filter
    Compliance {
        #[command(subcommand)]
        action: ComplianceAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show which providers are live and which fall back to placeholders
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum NarrativeAction {
    /// Generate a narrative
    Generate {
        /// Story topic
        #[arg(long, default_value = "default")]
        topic: String,

        /// Style (erotic, romantic, adventure)
        #[arg(long, default_value = "erotic")]
        style: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Frame content for a cultural context
    Adapt {
        /// Content to adapt
        content: String,

        /// Culture (universal, western, eastern, latin)
        #[arg(long, default_value = "universal")]
        culture: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Append a cliffhanger ending
    Cliffhanger {
        /// Narrative text
        narrative: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Append a character consistency note
    Character {
        /// Narrative text
        narrative: String,

        /// Character name (any profile flag replaces the default profile)
        #[arg(long)]
        name: Option<String>,

        /// Comma-separated traits
        #[arg(long, value_delimiter = ',')]
        traits: Vec<String>,

        /// Character background
        #[arg(long)]
        background: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum AssemblyAction {
    /// Generate an image from a prompt
    Image {
        /// Image prompt
        prompt: String,

        /// Style (realistic, anime, fantasy, sci-fi, erotic)
        #[arg(long, default_value = "realistic")]
        style: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Synthesize speech from text
    Audio {
        /// Text to speak
        text: String,

        /// Voice tag
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Package narrative, image and audio into one bundle
    Package {
        /// Narrative text
        #[arg(long)]
        narrative: String,

        /// Image reference
        #[arg(long)]
        image: String,

        /// Audio reference
        #[arg(long)]
        audio: String,

        /// Package title
        #[arg(long)]
        title: Option<String>,

        /// Style recorded in metadata
        #[arg(long)]
        style: Option<String>,

        /// Topic recorded in metadata
        #[arg(long)]
        topic: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Annotate an image reference with a watermark
    Watermark {
        /// Image reference
        image_url: String,

        /// Watermark text
        #[arg(long, default_value = DEFAULT_WATERMARK)]
        text: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum ComplianceAction {
    /// Check content against the filter terms
    Check {
        /// Content to check
        content: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration (API keys masked)
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation, e.g. models.text.model)
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_character_traits() {
        let cli = Cli::try_parse_from([
            "wagon",
            "narrative",
            "character",
            "Once upon a time",
            "--name",
            "Mira",
            "--traits",
            "bold,quiet",
        ])
        .expect("parse");

        match cli.command {
            Commands::Narrative {
                action: NarrativeAction::Character { name, traits, .. },
            } => {
                assert_eq!(name.as_deref(), Some("Mira"));
                assert_eq!(traits, vec!["bold".to_string(), "quiet".to_string()]);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_watermark_default_text() {
        let cli = Cli::try_parse_from(["wagon", "assembly", "watermark", "http://x/img.png"]).expect("parse");
        match cli.command {
            Commands::Assembly {
                action: AssemblyAction::Watermark { text, .. },
            } => assert_eq!(text, "WagonX"),
            _ => panic!("wrong command"),
        }
    }
}
