//! Content-generation agents
//!
//! Every agent wraps an [`AgentCore`]: its identity, declared capabilities,
//! the shared configuration and the cross-cutting services built on it
//! (credential lookup, model settings, compliance filtering, action logging).
//! Operations that call a provider resolve through [`AgentCore::live_key`]
//! and [`AgentCore::settle`], falling back to a local placeholder whenever the
//! live call cannot be made or never gets an answer.

use std::fmt;
use std::sync::Arc;

use crate::compliance::{ComplianceFilter, Verdict};
use crate::config::{Config, ModelConfig};
use crate::provider::{CallOutcome, Provider};

pub mod assembly;
pub mod compliance;
pub mod narrative;
pub mod result;

pub use result::{GenerationResult, Status};

/// The kinds of agent this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Narrative,
    Assembly,
    Compliance,
}

impl AgentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AgentKind::Narrative => "NarrativeAgent",
            AgentKind::Assembly => "AssemblyAgent",
            AgentKind::Compliance => "ComplianceAgent",
        }
    }

    /// Log target used for this kind's diagnostics
    pub fn log_target(&self) -> &'static str {
        match self {
            AgentKind::Narrative => "wagon::agent::narrative",
            AgentKind::Assembly => "wagon::agent::assembly",
            AgentKind::Compliance => "wagon::agent::compliance",
        }
    }

    pub fn default_capabilities(&self) -> Vec<String> {
        let tags: &[&str] = match self {
            AgentKind::Narrative => &[
                "narrative_generation",
                "cultural_adaptation",
                "cliffhanger_creation",
                "character_consistency",
            ],
            AgentKind::Assembly => &[
                "image_generation",
                "audio_synthesis",
                "content_packaging",
                "watermarking",
            ],
            AgentKind::Compliance => &["content_review"],
        };
        tags.iter().map(|t| t.to_string()).collect()
    }
}

/// Capability-set interface shared by all agents
#[allow(dead_code)] // kind/has_capability - for callers composing agents
pub trait Agent: fmt::Display {
    fn core(&self) -> &AgentCore;

    fn kind(&self) -> AgentKind {
        self.core().kind()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn capabilities(&self) -> &[String] {
        self.core().capabilities()
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.capabilities().iter().any(|c| c == capability)
    }
}

/// State and services common to every agent
pub struct AgentCore {
    kind: AgentKind,
    name: String,
    capabilities: Vec<String>,
    config: Arc<Config>,
    filter: ComplianceFilter,
}

impl AgentCore {
    pub fn new(kind: AgentKind, name: impl Into<String>, capabilities: Vec<String>, config: Arc<Config>) -> Self {
        let filter = ComplianceFilter::new(&config.compliance.nsfw);
        Self {
            kind,
            name: name.into(),
            capabilities,
            config,
            filter,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn filter(&self) -> &ComplianceFilter {
        &self.filter
    }

    fn target(&self) -> &'static str {
        self.kind.log_target()
    }

    /// API key for `service`, or an empty string when none is configured
    pub fn get_api_key(&self, service: &str) -> String {
        self.config
            .resolve_api_key(service)
            .map(|(key, _)| key)
            .unwrap_or_default()
    }

    /// Settings for `model_type`, all unset when not configured
    pub fn get_model_config(&self, model_type: &str) -> ModelConfig {
        self.config.model(model_type).cloned().unwrap_or_default()
    }

    pub fn is_compliant(&self, content: &str) -> bool {
        match self.filter.check(content) {
            Verdict::Allow => true,
            Verdict::Reject { term } => {
                log::warn!(target: self.target(), "Content failed compliance check: {}", term);
                false
            }
        }
    }

    /// Record an action with the names of its inputs (never their values)
    pub fn log_action(&self, action: &str, inputs: &[&str], status: Status) {
        log::info!(
            target: self.target(),
            "[{}] Action: {}, Inputs: {:?}, Status: {}",
            self.name,
            action,
            inputs,
            status
        );
    }

    /// Key for `provider` when it is present and well-formed
    pub fn live_key(&self, provider: Provider) -> Option<String> {
        let key = self.get_api_key(provider.service());
        if key.is_empty() {
            log::debug!(target: self.target(), "No {} credential, using placeholder", provider.name());
            return None;
        }
        if !provider.accepts_key(&key) {
            log::debug!(target: self.target(), "Malformed {} credential, using placeholder", provider.name());
            return None;
        }
        Some(key)
    }

    /// Turn a live call outcome into a result.
    ///
    /// Provider faults are reported as failed results carrying the status
    /// code. Transport faults are logged and replaced by the placeholder.
    pub fn settle<T, O>(
        &self,
        api_label: &str,
        outcome: CallOutcome<T>,
        on_success: impl FnOnce(T) -> GenerationResult<O>,
        placeholder: impl FnOnce() -> GenerationResult<O>,
    ) -> GenerationResult<O> {
        match outcome {
            CallOutcome::Success(value) => on_success(value),
            CallOutcome::ProviderFault { status } => {
                log::warn!(target: self.target(), "{} API returned status {}", api_label, status);
                GenerationResult::failed(format!("{} API error: {}", api_label, status))
            }
            CallOutcome::TransportFault(e) => {
                log::error!(target: self.target(), "Error calling {} API: {:#}", api_label, e);
                placeholder()
            }
        }
    }
}

impl fmt::Display for AgentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(name={}, capabilities={:?})",
            self.kind.type_name(),
            self.name,
            self.capabilities
        )
    }
}

/// Number of whitespace-separated words
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
