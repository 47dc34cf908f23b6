//! Provider transport
//!
//! Every live call goes through a [`Transport`]. The result is folded into a
//! [`CallOutcome`] so agents can pick between the live result, a reported
//! provider failure and the placeholder fallback without handling raw errors.

use eyre::{Context, Result};
use std::time::Duration;

pub mod openai;
pub mod stability;

/// Response bodies larger than this are treated as a transport fault
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// External generative services the agents know how to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    StableDiffusion,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::StableDiffusion];

    /// Service name used for key lookup (`api_keys.<service>`, `<SERVICE>_API_KEY`)
    pub fn service(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::StableDiffusion => "stable_diffusion",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::StableDiffusion => "Stable Diffusion",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::StableDiffusion => "https://api.stability.ai",
        }
    }

    /// Whether a key is shaped like one this provider issues
    pub fn accepts_key(&self, key: &str) -> bool {
        match self {
            Provider::OpenAi => key.starts_with("sk-"),
            Provider::StableDiffusion => !key.is_empty() && !key.contains(char::is_whitespace),
        }
    }
}

/// A JSON POST to a provider endpoint
pub struct ProviderRequest {
    pub url: String,
    pub api_key: String,
    pub accept: &'static str,
    pub body: serde_json::Value,
    pub timeout: Duration,
}

/// Raw HTTP reply: status code and body bytes
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends provider requests. `Err` means the provider was never heard from
/// (connect failure, timeout, unreadable body).
pub trait Transport: Send + Sync {
    fn post_json(&self, request: &ProviderRequest) -> Result<HttpReply>;
}

/// Outcome of a live provider call
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    /// Provider answered with a non-success status code
    ProviderFault { status: u16 },
    /// Network error, timeout or malformed response
    TransportFault(eyre::Report),
}

/// Blocking transport backed by ureq
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn post_json(&self, request: &ProviderRequest) -> Result<HttpReply> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(request.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let request_body = serde_json::to_string(&request.body).context("Failed to serialize request")?;

        let mut response = agent
            .post(&request.url)
            .header("Authorization", &format!("Bearer {}", request.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", request.accept)
            .send(request_body.as_bytes())
            .with_context(|| format!("Failed to call {}", request.url))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .context("Failed to read response")?;

        Ok(HttpReply { status, body })
    }
}

/// Send `request` and parse a successful body with `parse`.
/// A body that fails to parse counts as a transport fault.
pub fn call<T>(
    transport: &dyn Transport,
    request: &ProviderRequest,
    parse: impl FnOnce(&[u8]) -> Result<T>,
) -> CallOutcome<T> {
    let reply = match transport.post_json(request) {
        Ok(reply) => reply,
        Err(e) => return CallOutcome::TransportFault(e),
    };

    if !reply.is_success() {
        return CallOutcome::ProviderFault { status: reply.status };
    }

    match parse(&reply.body) {
        Ok(value) => CallOutcome::Success(value),
        Err(e) => CallOutcome::TransportFault(e.wrap_err(format!("Malformed response from {}", request.url))),
    }
}

/// Base URL from settings, without a trailing slash
pub(crate) fn base_url(provider: Provider, endpoint: Option<&str>) -> String {
    endpoint
        .unwrap_or(provider.default_base_url())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
pub mod testing {
    //! In-memory transport for exercising the live paths

    use super::*;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&ProviderRequest) -> Result<HttpReply> + Send + Sync>;

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub api_key: String,
        pub body: serde_json::Value,
        pub timeout: Duration,
    }

    pub struct StubTransport {
        respond: Responder,
        seen: Mutex<Vec<RecordedRequest>>,
    }

    impl StubTransport {
        pub fn replying(status: u16, body: impl Into<Vec<u8>>) -> Self {
            let body = body.into();
            Self::with(move |_| {
                Ok(HttpReply {
                    status,
                    body: body.clone(),
                })
            })
        }

        pub fn json(value: serde_json::Value) -> Self {
            Self::replying(200, value.to_string())
        }

        pub fn unreachable() -> Self {
            Self::with(|request| Err(eyre::eyre!("connection refused: {}", request.url)))
        }

        fn with(respond: impl Fn(&ProviderRequest) -> Result<HttpReply> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
        }

        pub fn calls(&self) -> usize {
            self.requests().len()
        }
    }

    impl Transport for StubTransport {
        fn post_json(&self, request: &ProviderRequest) -> Result<HttpReply> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(RecordedRequest {
                    url: request.url.clone(),
                    api_key: request.api_key.clone(),
                    body: request.body.clone(),
                    timeout: request.timeout,
                });
            }
            (self.respond)(request)
        }
    }
}
