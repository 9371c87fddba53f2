use super::classify::{classify, classify_error};
use super::inflight::InFlightSet;
use super::{AppId, ProbeClient, ProbeResult};
use crate::notify::{Locale, MessageCatalog, Notifier};
use crate::resilience::CircuitBreakerStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs on-demand probes for the providers of one application.
///
/// Probes for different providers may run concurrently; each tracks its own
/// in-flight mark. A second probe for a provider that is already being probed
/// is not rejected; whichever settles first clears the mark.
pub struct ProbeOrchestrator {
    app_id: AppId,
    client: Arc<dyn ProbeClient>,
    breakers: Arc<dyn CircuitBreakerStore>,
    notifier: Arc<dyn Notifier>,
    catalog: MessageCatalog,
    in_flight: InFlightSet,
}

impl ProbeOrchestrator {
    pub fn new(
        app_id: AppId,
        client: Arc<dyn ProbeClient>,
        breakers: Arc<dyn CircuitBreakerStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            app_id,
            client,
            breakers,
            notifier,
            catalog: MessageCatalog::default(),
            in_flight: InFlightSet::new(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.catalog = MessageCatalog::new(locale);
        self
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Probe one provider and report the outcome.
    ///
    /// Emits exactly one notification. Returns `None` when the probe client
    /// raised instead of returning a result.
    pub async fn begin_probe(&self, provider_id: &str, provider_name: &str) -> Option<ProbeResult> {
        let _mark = self.in_flight.enter(provider_id);
        debug!(app_id = %self.app_id, provider_id, "probe started");
        let started = Instant::now();

        let outcome = self.client.probe(&self.app_id, provider_id).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (decision, result) = match outcome {
            Ok(result) => {
                info!(
                    app_id = %self.app_id,
                    provider_id,
                    status = %result.status(),
                    response_time_ms = ?result.response_time_ms(),
                    elapsed_ms,
                    "probe finished"
                );
                (classify(&result), Some(result))
            }
            Err(err) => {
                warn!(
                    app_id = %self.app_id,
                    provider_id,
                    error = %err,
                    elapsed_ms,
                    "probe could not complete"
                );
                (classify_error(&err), None)
            }
        };

        if decision.reset_breaker {
            self.breakers.reset(provider_id, &self.app_id);
        }
        self.notifier
            .notify(decision.notification.render(provider_name, &self.catalog));

        result
    }

    /// Whether `provider_id` has a probe in flight.
    pub fn is_checking(&self, provider_id: &str) -> bool {
        self.in_flight.contains(provider_id)
    }

    /// Immutable snapshot of the in-flight provider ids.
    pub fn in_flight_snapshot(&self) -> Arc<HashSet<String>> {
        self.in_flight.snapshot()
    }
}
