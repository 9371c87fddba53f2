//! Streaming-request probe over HTTP.
//!
//! Sends one tiny streaming completion request and times the first body
//! chunk. Only the first chunk is read; the connection is dropped afterwards.

use super::{AppId, ProbeClient, ProbeResult};
use crate::config::{ApiFormat, ProbeSettings, ProviderConfig};
use crate::error::ErrorContext;
use crate::transport::{map_http_status_error, map_request_error, HttpTransport};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROBE_PROMPT: &str = "hi";

pub struct HttpProbeClient {
    settings: Arc<ProbeSettings>,
    transport: HttpTransport,
    degraded_threshold: Duration,
}

impl HttpProbeClient {
    pub fn new(settings: Arc<ProbeSettings>) -> Result<Self> {
        let transport = HttpTransport::new(&settings.probe)?;
        Ok(Self::with_transport(settings, transport))
    }

    pub fn with_transport(settings: Arc<ProbeSettings>, transport: HttpTransport) -> Self {
        let degraded_threshold = settings.probe.degraded_threshold();
        Self {
            settings,
            transport,
            degraded_threshold,
        }
    }

    /// Probe a provider directly, bypassing the settings lookup.
    pub async fn probe_provider(&self, provider: &ProviderConfig) -> Result<ProbeResult> {
        let api_key = HttpTransport::resolve_api_key(provider).ok_or_else(|| {
            Error::configuration_with_context(
                format!("no API key for provider '{}'", provider.id),
                ErrorContext::new()
                    .with_field_path(format!("{}.api_key", provider.id))
                    .with_source("http_probe"),
            )
        })?;

        let url = endpoint_url(provider.normalized_base_url(), provider.format);
        debug!(provider_id = %provider.id, url = %url, "sending probe request");

        let request = self
            .transport
            .client()
            .post(&url)
            .timeout(self.transport.timeout())
            .header("accept", "text/event-stream")
            .header("x-request-id", uuid::Uuid::new_v4().to_string())
            .json(&probe_body(&provider.model));
        let request = match provider.format {
            ApiFormat::OpenAi => request.bearer_auth(&api_key),
            ApiFormat::Anthropic => request
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let started = Instant::now();
        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return Ok(ProbeResult::failed(map_request_error(&e))),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(ProbeResult::failed(map_http_status_error(
                status.as_u16(),
                &body,
            )));
        }

        let mut body = response.bytes_stream();
        let first = match body.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => return Ok(ProbeResult::failed(map_request_error(&e))),
            None => return Ok(ProbeResult::failed("empty response body")),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Some(message) = first_chunk_error(&first) {
            return Ok(ProbeResult::failed(message));
        }

        Ok(self.grade(elapsed_ms))
    }

    fn grade(&self, elapsed_ms: u64) -> ProbeResult {
        if elapsed_ms <= self.degraded_threshold.as_millis() as u64 {
            ProbeResult::operational(elapsed_ms)
        } else {
            ProbeResult::degraded(elapsed_ms)
        }
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn probe(&self, app_id: &AppId, provider_id: &str) -> Result<ProbeResult> {
        let provider = self.settings.provider(app_id, provider_id).ok_or_else(|| {
            Error::configuration_with_context(
                format!("unknown provider '{}'", provider_id),
                ErrorContext::new()
                    .with_field_path(format!("apps.{}", app_id))
                    .with_source("http_probe"),
            )
        })?;
        self.probe_provider(provider).await
    }
}

fn endpoint_url(base_url: &str, format: ApiFormat) -> String {
    let path = match format {
        ApiFormat::OpenAi => "chat/completions",
        ApiFormat::Anthropic => "messages",
    };
    if base_url.ends_with("/v1") {
        format!("{}/{}", base_url, path)
    } else {
        format!("{}/v1/{}", base_url, path)
    }
}

fn probe_body(model: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": 1,
        "stream": true,
        "messages": [{ "role": "user", "content": PROBE_PROMPT }],
    })
}

/// Some relays answer 200 and put the error in the first event.
fn first_chunk_error(chunk: &Bytes) -> Option<String> {
    let text = std::str::from_utf8(chunk).ok()?;
    let payload = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("event:"))?;
    let payload = payload.strip_prefix("data:").unwrap_or(payload).trim();
    let value: Value = serde_json::from_str(payload).ok()?;
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| error.to_string());
    Some(message)
}
