//! Decision table from probe outcome to side effects.
//!
//! | Outcome | Notification | Breaker reset |
//! |---------|--------------|---------------|
//! | `operational` | success | yes |
//! | `degraded` | warning | yes |
//! | `failed` | error + advisory hint | no |
//! | transport error | error + advisory hint | no |
//!
//! A degraded round trip still completed, so it proves the provider is
//! reachable, which is what the breaker tracks. Failures never reset, so real
//! failure history survives.

use super::ProbeResult;
use crate::notify::{MessageCatalog, Notification, NotificationLevel};
use crate::Error;

/// What a notification says, before localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeBody {
    Operational { response_time_ms: u64 },
    Degraded { response_time_ms: u64 },
    Failed { message: String },
    Errored { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSpec {
    pub level: NotificationLevel,
    pub body: NoticeBody,
    /// Attach the "results are best-effort" advisory as description.
    pub with_hint: bool,
}

impl NotificationSpec {
    pub fn render(&self, provider_name: &str, catalog: &MessageCatalog) -> Notification {
        let message = match &self.body {
            NoticeBody::Operational { response_time_ms } => {
                catalog.operational(provider_name, *response_time_ms)
            }
            NoticeBody::Degraded { response_time_ms } => {
                catalog.degraded(provider_name, *response_time_ms)
            }
            NoticeBody::Failed { message } => catalog.failed(provider_name, message),
            NoticeBody::Errored { error } => catalog.errored(provider_name, error),
        };
        let notification = Notification::new(self.level, message);
        if self.with_hint {
            notification.with_description(catalog.failed_hint())
        } else {
            notification
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeDecision {
    pub notification: NotificationSpec,
    pub reset_breaker: bool,
}

pub fn classify(result: &ProbeResult) -> ProbeDecision {
    match result {
        ProbeResult::Operational { response_time_ms } => ProbeDecision {
            notification: NotificationSpec {
                level: NotificationLevel::Success,
                body: NoticeBody::Operational {
                    response_time_ms: *response_time_ms,
                },
                with_hint: false,
            },
            reset_breaker: true,
        },
        ProbeResult::Degraded { response_time_ms } => ProbeDecision {
            notification: NotificationSpec {
                level: NotificationLevel::Warning,
                body: NoticeBody::Degraded {
                    response_time_ms: *response_time_ms,
                },
                with_hint: false,
            },
            reset_breaker: true,
        },
        ProbeResult::Failed { message } => ProbeDecision {
            notification: NotificationSpec {
                level: NotificationLevel::Error,
                body: NoticeBody::Failed {
                    message: message.clone(),
                },
                with_hint: true,
            },
            reset_breaker: false,
        },
    }
}

/// Decision for a probe client that raised instead of returning a result.
pub fn classify_error(error: &Error) -> ProbeDecision {
    ProbeDecision {
        notification: NotificationSpec {
            level: NotificationLevel::Error,
            body: NoticeBody::Errored {
                error: error.to_string(),
            },
            with_hint: true,
        },
        reset_breaker: false,
    }
}
