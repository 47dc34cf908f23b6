use eyre::Result;
use std::sync::Arc;

use crate::agent::AgentKind;
use crate::agent::assembly::{AssemblyAgent, PackageOptions};
use crate::cli::{AssemblyAction, OutputFormat};
use crate::config::Config;

use super::print_result;

pub fn run(action: AssemblyAction, config: Arc<Config>) -> Result<()> {
    let agent = AssemblyAgent::new("assembly", AgentKind::Assembly.default_capabilities(), config);
    log::debug!("Running {}", agent);

    match action {
        AssemblyAction::Image { prompt, style, format } => print_result(
            "generate_image",
            &agent.generate_image(&prompt, &style),
            OutputFormat::resolve(format),
        ),
        AssemblyAction::Audio { text, voice, format } => print_result(
            "synthesize_audio",
            &agent.synthesize_audio(&text, &voice),
            OutputFormat::resolve(format),
        ),
        AssemblyAction::Package {
            narrative,
            image,
            audio,
            title,
            style,
            topic,
            format,
        } => {
            let options = PackageOptions { title, style, topic };
            print_result(
                "package_content",
                &agent.package_content(&narrative, &image, &audio, &options),
                OutputFormat::resolve(format),
            )
        }
        AssemblyAction::Watermark {
            image_url,
            text,
            format,
        } => print_result(
            "add_watermark",
            &agent.add_watermark(&image_url, &text),
            OutputFormat::resolve(format),
        ),
    }
}
