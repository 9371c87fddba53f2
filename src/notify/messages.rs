//! Localized notification text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en", alias = "en-US")]
    En,
    #[serde(rename = "zh-CN", alias = "zh")]
    ZhCn,
}

impl Locale {
    /// Parse a BCP-47-ish tag (`en`, `en-US`, `zh`, `zh_CN`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase().replace('_', "-");
        match tag.as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "zh" | "zh-cn" | "zh-hans" => Some(Locale::ZhCn),
            _ => None,
        }
    }
}

/// Renders the probe outcome messages for one locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCatalog {
    locale: Locale,
}

impl MessageCatalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn operational(&self, name: &str, time_ms: u64) -> String {
        match self.locale {
            Locale::En => format!("{} is operational ({}ms)", name, time_ms),
            Locale::ZhCn => format!("{} 运行正常 ({}ms)", name, time_ms),
        }
    }

    pub fn degraded(&self, name: &str, time_ms: u64) -> String {
        match self.locale {
            Locale::En => format!("{} is responding slowly ({}ms)", name, time_ms),
            Locale::ZhCn => format!("{} 响应较慢 ({}ms)", name, time_ms),
        }
    }

    pub fn failed(&self, name: &str, error: &str) -> String {
        match self.locale {
            Locale::En => format!("{} check failed: {}", name, error),
            Locale::ZhCn => format!("{} 检查失败: {}", name, error),
        }
    }

    pub fn errored(&self, name: &str, error: &str) -> String {
        match self.locale {
            Locale::En => format!("{} check errored: {}", name, error),
            Locale::ZhCn => format!("{} 检查出错: {}", name, error),
        }
    }

    /// Advisory attached to every failure notification.
    pub fn failed_hint(&self) -> &'static str {
        match self.locale {
            Locale::En => {
                "Results are for reference only. Some providers may not support this check; verify manually."
            }
            Locale::ZhCn => {
                "检测结果仅供参考，部分供应商可能不支持此检测方式，建议手动测试确认。"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("en-US"), Some(Locale::En));
        assert_eq!(Locale::from_tag(" zh_CN "), Some(Locale::ZhCn));
        assert_eq!(Locale::from_tag("fr"), None);
    }

    #[test]
    fn test_english_messages() {
        let c = MessageCatalog::new(Locale::En);
        assert_eq!(c.operational("Relay", 120), "Relay is operational (120ms)");
        assert_eq!(c.degraded("Relay", 7000), "Relay is responding slowly (7000ms)");
        assert_eq!(c.failed("Relay", "HTTP 500"), "Relay check failed: HTTP 500");
        assert_eq!(c.errored("Relay", "boom"), "Relay check errored: boom");
    }

    #[test]
    fn test_chinese_messages() {
        let c = MessageCatalog::new(Locale::ZhCn);
        assert_eq!(c.operational("中转", 88), "中转 运行正常 (88ms)");
        assert!(c.failed_hint().starts_with("检测结果仅供参考"));
    }

    #[test]
    fn test_locale_serde_tags() {
        let l: Locale = serde_yaml::from_str("zh").unwrap();
        assert_eq!(l, Locale::ZhCn);
        assert_eq!(serde_yaml::to_string(&Locale::En).unwrap().trim(), "en");
    }
}
