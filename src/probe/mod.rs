//! 供应商探测模块：按需单次探测、三态健康分类、熔断器协同。
//!
//! # Provider Probing
//!
//! A probe is a single, user-triggered liveness/latency check against one
//! provider. The flow for one invocation of
//! [`ProbeOrchestrator::begin_probe`]:
//!
//! 1. mark the provider in-flight ([`InFlightSet`])
//! 2. call the [`ProbeClient`] (the only suspension point)
//! 3. [`classify`] the outcome into a notification and a breaker decision
//! 4. reset the breaker if the provider proved reachable
//! 5. clear the in-flight mark, on every exit path
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ProbeResult`] | Tri-state verdict returned by a probe client |
//! | [`ProbeClient`] | Trait for anything that can probe a provider |
//! | [`HttpProbeClient`] | Streaming-request probe over HTTP |
//! | [`InFlightSet`] | Copy-on-write set of providers being probed |
//! | [`classify`] | Pure decision table |
//! | [`ProbeOrchestrator`] | Ties the above together |

pub mod classify;
pub mod http;
pub mod inflight;
pub mod orchestrator;

pub use classify::{classify, classify_error, NoticeBody, NotificationSpec, ProbeDecision};
pub use http::HttpProbeClient;
pub use inflight::{InFlightGuard, InFlightSet};
pub use orchestrator::ProbeOrchestrator;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application (context) a provider belongs to, e.g. `claude` or `codex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifies one probe target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderProbeKey {
    pub app_id: AppId,
    pub provider_id: String,
}

impl ProviderProbeKey {
    pub fn new(app_id: AppId, provider_id: impl Into<String>) -> Self {
        Self {
            app_id,
            provider_id: provider_id.into(),
        }
    }
}

impl fmt::Display for ProviderProbeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.provider_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Operational,
    Degraded,
    Failed,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Operational => "operational",
            ProbeStatus::Degraded => "degraded",
            ProbeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a probe that ran to completion.
///
/// Serializes as `{"status": "operational", "responseTimeMs": 120}` or
/// `{"status": "failed", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    Operational {
        #[serde(rename = "responseTimeMs")]
        response_time_ms: u64,
    },
    Degraded {
        #[serde(rename = "responseTimeMs")]
        response_time_ms: u64,
    },
    Failed { message: String },
}

impl ProbeResult {
    pub fn operational(response_time_ms: u64) -> Self {
        ProbeResult::Operational { response_time_ms }
    }

    pub fn degraded(response_time_ms: u64) -> Self {
        ProbeResult::Degraded { response_time_ms }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ProbeResult::Failed {
            message: message.into(),
        }
    }

    pub fn status(&self) -> ProbeStatus {
        match self {
            ProbeResult::Operational { .. } => ProbeStatus::Operational,
            ProbeResult::Degraded { .. } => ProbeStatus::Degraded,
            ProbeResult::Failed { .. } => ProbeStatus::Failed,
        }
    }

    pub fn response_time_ms(&self) -> Option<u64> {
        match self {
            ProbeResult::Operational { response_time_ms }
            | ProbeResult::Degraded { response_time_ms } => Some(*response_time_ms),
            ProbeResult::Failed { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ProbeResult::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Performs one probe call.
///
/// Returning `Err` means the probe itself could not complete (a transport
/// error), as opposed to `Ok(ProbeResult::Failed { .. })`, which means the
/// provider was reached or attempted and found unhealthy. Implementations own
/// any timeout.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, app_id: &AppId, provider_id: &str) -> Result<ProbeResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_result_wire_format() {
        let ok = serde_json::to_value(ProbeResult::operational(120)).unwrap();
        assert_eq!(ok, json!({"status": "operational", "responseTimeMs": 120}));

        let failed: ProbeResult =
            serde_json::from_value(json!({"status": "failed", "message": "HTTP 500"})).unwrap();
        assert_eq!(failed, ProbeResult::failed("HTTP 500"));
        assert_eq!(failed.message(), Some("HTTP 500"));
        assert_eq!(failed.response_time_ms(), None);
    }

    #[test]
    fn test_status_accessors() {
        assert_eq!(ProbeResult::degraded(9000).status(), ProbeStatus::Degraded);
        assert_eq!(ProbeResult::degraded(9000).response_time_ms(), Some(9000));
        assert_eq!(ProbeStatus::Operational.to_string(), "operational");
    }

    #[test]
    fn test_key_display() {
        let key = ProviderProbeKey::new(AppId::new("codex"), "relay");
        assert_eq!(key.to_string(), "codex/relay");
    }
}
