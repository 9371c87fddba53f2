//! 熔断器模块：按 (供应商, 应用) 维护熔断状态，探测成功后可重置。
//!
//! # Circuit Breaker Store
//!
//! The probe orchestrator only ever *resets* breakers; counting failures and
//! opening the circuit is the job of whatever sends real traffic. This module
//! defines that seam ([`CircuitBreakerStore`]) and ships an in-process store
//! ([`CircuitBreakerRegistry`]) keyed by [`ProviderProbeKey`].
//!
//! ```rust
//! use provider_probe::probe::AppId;
//! use provider_probe::resilience::{CircuitBreakerRegistry, CircuitBreakerStore};
//!
//! let registry = CircuitBreakerRegistry::default();
//! let app = AppId::new("claude");
//! registry.breaker("relay", &app).record_failure();
//! registry.reset("relay", &app);
//! assert_eq!(registry.snapshot("relay", &app).unwrap().consecutive_failures, 0);
//! ```

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot};

use crate::probe::{AppId, ProviderProbeKey};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// External owner of per-provider breaker state.
///
/// `reset` is fire-and-forget: callers neither await nor inspect its outcome.
pub trait CircuitBreakerStore: Send + Sync {
    fn reset(&self, provider_id: &str, app_id: &AppId);
}

/// In-process breaker store, one [`CircuitBreaker`] per key, created lazily.
pub struct CircuitBreakerRegistry {
    cfg: CircuitBreakerConfig,
    breakers: RwLock<HashMap<ProviderProbeKey, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self {
            cfg,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the breaker for a key.
    pub fn breaker(&self, provider_id: &str, app_id: &AppId) -> Arc<CircuitBreaker> {
        let key = ProviderProbeKey::new(app_id.clone(), provider_id);
        if let Some(existing) = self.lookup(&key) {
            return existing;
        }
        match self.breakers.write() {
            Ok(mut map) => map
                .entry(key)
                .or_insert_with(|| Arc::new(CircuitBreaker::new(self.cfg.clone())))
                .clone(),
            // Poisoned: hand out a detached breaker rather than panic.
            Err(_) => Arc::new(CircuitBreaker::new(self.cfg.clone())),
        }
    }

    pub fn snapshot(&self, provider_id: &str, app_id: &AppId) -> Option<CircuitBreakerSnapshot> {
        let key = ProviderProbeKey::new(app_id.clone(), provider_id);
        self.lookup(&key).map(|b| b.snapshot())
    }

    /// Snapshots of every known breaker for one app, sorted by provider id.
    pub fn snapshots_for(&self, app_id: &AppId) -> Vec<(String, CircuitBreakerSnapshot)> {
        let mut out: Vec<_> = match self.breakers.read() {
            Ok(map) => map
                .iter()
                .filter(|(k, _)| &k.app_id == app_id)
                .map(|(k, b)| (k.provider_id.clone(), b.snapshot()))
                .collect(),
            Err(_) => Vec::new(),
        };
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn lookup(&self, key: &ProviderProbeKey) -> Option<Arc<CircuitBreaker>> {
        self.breakers.read().ok().and_then(|map| map.get(key).cloned())
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreakerStore for CircuitBreakerRegistry {
    fn reset(&self, provider_id: &str, app_id: &AppId) {
        // Unknown keys have no failure history to clear.
        let key = ProviderProbeKey::new(app_id.clone(), provider_id);
        if let Some(breaker) = self.lookup(&key) {
            breaker.reset();
            tracing::debug!(provider_id, app_id = %app_id, "circuit breaker reset");
        }
    }
}
