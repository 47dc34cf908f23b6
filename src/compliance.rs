//! Content compliance filter
//!
//! A coarse substring gate over generated text. No context, stemming or
//! severity weighting: a configured term anywhere in the content rejects it.

use crate::config::NsfwConfig;

/// Fixed reason reported when content is rejected
pub const REJECTION_REASON: &str = "Content failed compliance check";

/// Result of a compliance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject { term: String },
}

/// Case-insensitive substring filter built from the `compliance.nsfw` config
pub struct ComplianceFilter {
    enabled: bool,
    terms: Vec<String>,
}

impl ComplianceFilter {
    pub fn new(config: &NsfwConfig) -> Self {
        Self {
            enabled: config.enabled,
            terms: config.content_filters.clone(),
        }
    }

    /// Number of terms consulted when the filter is on
    pub fn active_terms(&self) -> usize {
        if self.enabled { self.terms.len() } else { 0 }
    }

    pub fn check(&self, content: &str) -> Verdict {
        if !self.enabled {
            return Verdict::Allow;
        }

        let content = content.to_lowercase();
        for term in &self.terms {
            if content.contains(&term.to_lowercase()) {
                return Verdict::Reject { term: term.clone() };
            }
        }

        Verdict::Allow
    }
}
