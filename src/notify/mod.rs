//! 通知模块：探测结果以成功/警告/错误三种级别推送给展示层。
//!
//! Notification sinks.
//!
//! The probe orchestrator emits exactly one [`Notification`] per probe. How it is
//! shown (toast, log line, status bar) is up to the [`Notifier`] implementation.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Notifier`] | Trait for notification destinations |
//! | [`NoopNotifier`] | Discards everything |
//! | [`InMemoryNotifier`] | Records notifications, for tests and headless callers |
//! | [`TracingNotifier`] | Writes notifications to the `tracing` log |
//! | [`CompositeNotifier`] | Fans out to several notifiers |

pub mod messages;

pub use messages::{Locale, MessageCatalog};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// A rendered, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Destination for notifications. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

pub fn noop_notifier() -> Arc<dyn Notifier> {
    Arc::new(NoopNotifier)
}

/// In-memory notifier, bounded to the most recent `max` entries.
pub struct InMemoryNotifier {
    events: RwLock<Vec<Notification>>,
    max_events: usize,
}

impl InMemoryNotifier {
    pub fn new(max: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max.max(1),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.events
            .read()
            .ok()
            .and_then(|events| events.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut events) = self.events.write() {
            events.push(notification);
            if events.len() > self.max_events {
                events.remove(0);
            }
        }
    }
}

/// Logs notifications at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.level {
            NotificationLevel::Success => {
                tracing::info!(description, "{}", n.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(description, "{}", n.message)
            }
            NotificationLevel::Error => {
                tracing::error!(description, "{}", n.message)
            }
        }
    }
}

/// Forwards each notification to every inner notifier.
#[derive(Default)]
pub struct CompositeNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Notifier for CompositeNotifier {
    fn notify(&self, notification: Notification) {
        for s in &self.sinks {
            s.notify(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_is_bounded() {
        let sink = InMemoryNotifier::new(2);
        for i in 0..3 {
            sink.notify(Notification::new(NotificationLevel::Success, format!("n{}", i)));
        }
        let messages: Vec<_> = sink.notifications().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["n1", "n2"]);
        assert_eq!(sink.last().unwrap().message, "n2");
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_composite_fans_out() {
        let a = Arc::new(InMemoryNotifier::default());
        let b = Arc::new(InMemoryNotifier::default());
        let composite = CompositeNotifier::new()
            .add(a.clone())
            .add(b.clone())
            .add(noop_notifier());
        composite.notify(
            Notification::new(NotificationLevel::Error, "down").with_description("hint"),
        );
        assert_eq!(a.len(), 1);
        assert_eq!(b.last().unwrap().description.as_deref(), Some("hint"));
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(NotificationLevel::Success.to_string(), "success");
    }
}
