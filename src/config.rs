//! 探测配置：超时、降级阈值、语言以及按应用分组的供应商清单。
//!
//! Probe configuration.
//!
//! Settings come from three layers, applied in order:
//!
//! 1. Built-in defaults ([`ProbeConfig::default`])
//! 2. A YAML settings file ([`ProbeSettings::load`])
//! 3. `PROVIDER_PROBE_*` environment variables ([`ProbeConfig::apply_env`])
//!
//! ```yaml
//! probe:
//!   timeout_secs: 45
//!   degraded_threshold_ms: 6000
//!   locale: en
//! apps:
//!   claude:
//!     - id: anthropic-main
//!       name: Anthropic
//!       base_url: https://api.anthropic.com
//!       format: anthropic
//!       model: claude-3-5-haiku-latest
//!       api_key_env: ANTHROPIC_API_KEY
//! ```

use crate::error::ErrorContext;
use crate::notify::messages::Locale;
use crate::probe::AppId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_DEGRADED_THRESHOLD_MS: u64 = 6000;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 120;

const ENV_TIMEOUT_SECS: &str = "PROVIDER_PROBE_TIMEOUT_SECS";
const ENV_DEGRADED_MS: &str = "PROVIDER_PROBE_DEGRADED_MS";
const ENV_LOCALE: &str = "PROVIDER_PROBE_LOCALE";
const ENV_PROXY_URL: &str = "PROVIDER_PROBE_PROXY_URL";

/// Runtime knobs for a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Whole-request timeout owned by the probe client.
    pub timeout_secs: u64,
    /// Round trips slower than this are reported as degraded.
    pub degraded_threshold_ms: u64,
    pub locale: Locale,
    pub proxy_url: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            degraded_threshold_ms: DEFAULT_DEGRADED_THRESHOLD_MS,
            locale: Locale::default(),
            proxy_url: None,
        }
    }
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Overlay `PROVIDER_PROBE_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by the `PROVIDER_PROBE_*` names.
    ///
    /// Unparseable values are ignored rather than rejected.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        if let Some(secs) = number(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs;
        }
        if let Some(ms) = number(ENV_DEGRADED_MS) {
            self.degraded_threshold_ms = ms;
        }
        if let Some(locale) = lookup(ENV_LOCALE).and_then(|s| Locale::from_tag(&s)) {
            self.locale = locale;
        }
        if let Some(proxy) = lookup(ENV_PROXY_URL) {
            let proxy = proxy.trim();
            if !proxy.is_empty() {
                self.proxy_url = Some(proxy.to_string());
            }
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_degraded_threshold(mut self, threshold: Duration) -> Self {
        self.degraded_threshold_ms = threshold.as_millis() as u64;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Effective timeout, clamped to 5..=120 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    pub fn degraded_threshold(&self) -> Duration {
        Duration::from_millis(self.degraded_threshold_ms)
    }
}

/// Wire dialect spoken by a provider endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    #[default]
    #[serde(alias = "openai_chat")]
    OpenAi,
    Anthropic,
}

/// One upstream provider as declared in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub base_url: String,
    #[serde(default)]
    pub format: ApiFormat,
    /// Model used for the probe request.
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            base_url: base_url.into(),
            format: ApiFormat::default(),
            model: model.into(),
            api_key: None,
            api_key_env: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_format(mut self, format: ApiFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Name shown to users; falls back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Base URL without surrounding whitespace or trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

/// Contents of a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub apps: BTreeMap<String, Vec<ProviderConfig>>,
}

impl ProbeSettings {
    /// Load, validate and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read settings file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("settings_loader"),
            )
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut settings: ProbeSettings = serde_yaml::from_str(raw)?;
        settings.probe = settings.probe.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (app, providers) in &self.apps {
            let mut seen = HashSet::new();
            for (idx, provider) in providers.iter().enumerate() {
                let field = |name: &str| format!("apps.{}[{}].{}", app, idx, name);
                if provider.id.trim().is_empty() {
                    return Err(Error::validation_with_context(
                        "provider id must not be empty",
                        ErrorContext::new()
                            .with_field_path(field("id"))
                            .with_source("settings_loader"),
                    ));
                }
                if !seen.insert(provider.id.as_str()) {
                    return Err(Error::validation_with_context(
                        format!("duplicate provider id '{}'", provider.id),
                        ErrorContext::new()
                            .with_field_path(field("id"))
                            .with_source("settings_loader"),
                    ));
                }
                if let Err(e) = url::Url::parse(provider.normalized_base_url()) {
                    return Err(Error::validation_with_context(
                        format!("invalid base URL '{}'", provider.base_url),
                        ErrorContext::new()
                            .with_field_path(field("base_url"))
                            .with_details(e.to_string())
                            .with_source("settings_loader"),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn providers(&self, app_id: &AppId) -> &[ProviderConfig] {
        self.apps
            .get(app_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn provider(&self, app_id: &AppId, provider_id: &str) -> Option<&ProviderConfig> {
        self.providers(app_id).iter().find(|p| p.id == provider_id)
    }

    pub fn with_provider(mut self, app_id: &AppId, provider: ProviderConfig) -> Self {
        self.apps
            .entry(app_id.as_str().to_string())
            .or_default()
            .push(provider);
        self
    }
}
