//! # provider-probe
//!
//! 供应商健康探测与熔断恢复协调核心，以及模型名称建议引擎。
//!
//! On-demand health probing for upstream AI providers, with circuit-breaker
//! recovery and a model-name suggestion engine.
//!
//! ## Overview
//!
//! An operator triggers a one-shot probe for a provider. The outcome is
//! classified as `operational`, `degraded` or `failed`, exactly one
//! notification is emitted, and if the provider proved reachable its circuit
//! breaker is reset. There is no retry, polling or probe history.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use provider_probe::config::ProbeSettings;
//! use provider_probe::notify::TracingNotifier;
//! use provider_probe::probe::{AppId, HttpProbeClient, ProbeOrchestrator};
//! use provider_probe::resilience::CircuitBreakerRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> provider_probe::Result<()> {
//!     let settings = Arc::new(ProbeSettings::load("providers.yaml")?);
//!     let orchestrator = ProbeOrchestrator::new(
//!         AppId::new("claude"),
//!         Arc::new(HttpProbeClient::new(settings.clone())?),
//!         Arc::new(CircuitBreakerRegistry::default()),
//!         Arc::new(TracingNotifier),
//!     );
//!
//!     if let Some(result) = orchestrator.begin_probe("relay", "My Relay").await {
//!         println!("{:?}", result.status());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`probe`] | Probe orchestration, classification, HTTP probe client |
//! | [`resilience`] | Circuit breakers and the breaker store seam |
//! | [`notify`] | Notification sinks and localized messages |
//! | [`suggest`] | Candidate scoring, ranking and the dropdown state machine |
//! | [`models`] | Fetching model ids from OpenAI-compatible endpoints |
//! | [`config`] | Settings file and environment overrides |
//! | [`transport`] | Shared HTTP client and error mapping |

pub mod config;
pub mod models;
pub mod notify;
pub mod probe;
pub mod resilience;
pub mod suggest;
pub mod transport;

pub use config::{ProbeConfig, ProbeSettings, ProviderConfig};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use probe::{AppId, ProbeClient, ProbeOrchestrator, ProbeResult, ProbeStatus};
pub use resilience::{CircuitBreakerRegistry, CircuitBreakerStore};
pub use suggest::ModelSuggest;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
