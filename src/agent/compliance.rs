//! Compliance agent: reviews content against the configured filter

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::{Agent, AgentCore, AgentKind, GenerationResult, Status};
use crate::compliance::REJECTION_REASON;
use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub content_length: usize,
    pub filters_checked: usize,
}

pub struct ComplianceAgent {
    core: AgentCore,
}

impl ComplianceAgent {
    pub fn new(name: impl Into<String>, capabilities: Vec<String>, config: Arc<Config>) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Compliance, name, capabilities, config),
        }
    }

    pub fn review_content(&self, content: &str) -> GenerationResult<Review> {
        let result = if self.core.is_compliant(content) {
            GenerationResult::completed(
                Status::Success,
                Review {
                    content_length: content.chars().count(),
                    filters_checked: self.core.filter().active_terms(),
                },
            )
        } else {
            GenerationResult::failed(REJECTION_REASON)
        };

        self.core.log_action("review_content", &["content"], result.status());
        result
    }
}

impl Agent for ComplianceAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }
}

impl fmt::Display for ComplianceAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.core, f)
    }
}
