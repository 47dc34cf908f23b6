use eyre::Result;
use std::sync::Arc;

use crate::agent::AgentKind;
use crate::agent::compliance::ComplianceAgent;
use crate::cli::{ComplianceAction, OutputFormat};
use crate::config::Config;

use super::print_result;

pub fn run(action: ComplianceAction, config: Arc<Config>) -> Result<()> {
    let agent = ComplianceAgent::new("compliance", AgentKind::Compliance.default_capabilities(), config);

    match action {
        ComplianceAction::Check { content, format } => print_result(
            "review_content",
            &agent.review_content(&content),
            OutputFormat::resolve(format),
        ),
    }
}
