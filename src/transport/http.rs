use super::TransportError;
use crate::config::{ProbeConfig, ProviderConfig};
use crate::Result;
use keyring::Entry;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

const KEYRING_SERVICE: &str = "provider-probe";
const ERROR_TAIL_CHARS: usize = 180;

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// The per-request timeout comes from [`ProbeConfig::timeout`]; the probe
/// orchestrator itself never times anything out.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let timeout = config.timeout();
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .user_agent(concat!("provider-probe/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = config.proxy_url.as_deref() {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client, timeout })
    }

    /// Wrap an existing client (mainly for tests).
    pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up the API key for a provider.
    ///
    /// Order: inline key, OS keyring, `api_key_env`, `{PROVIDER_ID}_API_KEY`.
    pub fn resolve_api_key(provider: &ProviderConfig) -> Option<String> {
        // 1. Inline
        if let Some(key) = provider.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }

        // 2. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, &provider.id) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        // 3. Explicit env var, then PROVIDER_ID_API_KEY
        if let Some(var) = provider.api_key_env.as_deref() {
            if let Some(key) = non_empty_env(var) {
                return Some(key);
            }
        }
        non_empty_env(&default_key_env(&provider.id))
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `my-relay` -> `MY_RELAY_API_KEY`
pub(crate) fn default_key_env(provider_id: &str) -> String {
    let upper: String = provider_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_API_KEY", upper)
}

/// Human-readable message for a non-2xx response.
pub fn map_http_status_error(status: u16, body: &str) -> String {
    let tail = compact_error_tail(body);
    match status {
        401 | 403 => format!(
            "authentication failed, check the API key (HTTP {}){}",
            status, tail
        ),
        404 | 405 => format!(
            "endpoint not found, check that the base URL is OpenAI/Anthropic compatible (HTTP {}){}",
            status, tail
        ),
        429 => format!("rate limited, retry later (HTTP 429){}", tail),
        _ => format!("request failed (HTTP {}){}", status, tail),
    }
}

/// Single-line, length-capped rendering of an error body, prefixed with `": "`.
pub fn compact_error_tail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let single_line = trimmed.replace(['\r', '\n'], " ");
    let mut short = single_line.chars().take(ERROR_TAIL_CHARS).collect::<String>();
    if single_line.chars().count() > ERROR_TAIL_CHARS {
        short.push_str("...");
    }
    format!(": {}", short)
}

pub fn map_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "request timed out, check the network or proxy settings".to_string();
    }
    if err.is_connect() {
        return format!("connection failed: {}", err);
    }
    format!("request failed: {}", err)
}
