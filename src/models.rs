//! 模型列表获取：从 OpenAI 兼容的 `/models` 端点拉取可选模型，作为建议候选。
//!
//! Remote model listing for OpenAI-compatible endpoints.
//!
//! Base URLs in the wild come with or without a `/v1` suffix, so several
//! candidate URLs are tried in order. A 404/405 (or a network error) on a
//! non-final candidate falls through to the next one and is recorded as a
//! warning.

use crate::error::ErrorContext;
use crate::transport::{map_http_status_error, map_request_error, TransportError};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchModelsResponse {
    pub models: Vec<ModelDescriptor>,
    pub resolved_url: String,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FetchModelsResponse {
    /// Model ids, ready to use as suggestion candidates.
    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ModelsPayload {
    #[serde(default)]
    data: Vec<ModelItem>,
}

#[derive(Debug, Deserialize)]
struct ModelItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    owned_by: Option<String>,
    #[serde(default)]
    created: Option<i64>,
}

pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<FetchModelsResponse> {
    let base_url = base_url.trim().trim_end_matches('/');
    if base_url.is_empty() {
        return Err(Error::validation_with_context(
            "base URL must not be empty",
            ErrorContext::new()
                .with_field_path("base_url")
                .with_source("models"),
        ));
    }
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(Error::validation_with_context(
            "API key must not be empty",
            ErrorContext::new()
                .with_field_path("api_key")
                .with_source("models"),
        ));
    }

    let urls = build_models_urls(base_url);
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut last_error: Option<Error> = None;

    for (index, url) in urls.iter().enumerate() {
        let is_last = index + 1 == urls.len();
        debug!(url = %url, "fetching model list");
        let response = client
            .get(url)
            .bearer_auth(api_key)
            .header("accept", "application/json")
            .timeout(timeout)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if resp.status().is_success() {
                    let payload = resp.json::<Value>().await.map_err(|e| {
                        Error::runtime_with_context(
                            "the model endpoint returned non-JSON",
                            ErrorContext::new()
                                .with_details(format!("{}: {}", url, e))
                                .with_source("models"),
                        )
                    })?;
                    let models = parse_models_from_payload(payload)?;
                    return Ok(FetchModelsResponse {
                        models,
                        resolved_url: url.clone(),
                        elapsed_ms: start.elapsed().as_millis() as u64,
                        warnings,
                    });
                }

                let body = resp.text().await.unwrap_or_default();
                if !is_last && (status == 404 || status == 405) {
                    warnings.push(format!(
                        "{} returned HTTP {}, tried fallback URL",
                        url, status
                    ));
                    continue;
                }
                return Err(Error::Remote {
                    status,
                    message: map_http_status_error(status, &body),
                });
            }
            Err(err) => {
                let message = map_request_error(&err);
                last_error = Some(Error::Transport(TransportError::Other(message)));
                if !is_last {
                    warnings.push(format!("{} request failed, tried fallback URL", url));
                    continue;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::runtime_with_context(
            "failed to fetch models",
            ErrorContext::new().with_source("models"),
        )
    }))
}

/// Candidate model-list URLs for a base URL, in try order.
pub fn build_models_urls(base_url: &str) -> Vec<String> {
    let normalized = base_url.trim().trim_end_matches('/');
    if normalized.is_empty() {
        return vec![];
    }
    if normalized.ends_with("/models") {
        return vec![normalized.to_string()];
    }

    let mut urls = Vec::new();
    if !normalized.ends_with("/v1") {
        urls.push(format!("{}/v1/models", normalized));
    }
    urls.push(format!("{}/models", normalized));
    urls
}

/// Keep non-empty trimmed ids, first occurrence wins, sorted by id.
pub fn parse_models_from_payload(payload: Value) -> Result<Vec<ModelDescriptor>> {
    let parsed: ModelsPayload = serde_json::from_value(payload)?;

    let mut deduped: BTreeMap<String, ModelDescriptor> = BTreeMap::new();
    for item in parsed.data {
        let Some(id) = item
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        deduped.entry(id.clone()).or_insert(ModelDescriptor {
            id,
            owned_by: item.owned_by,
            created: item.created,
        });
    }

    Ok(deduped.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls_with_and_without_v1() {
        assert_eq!(
            build_models_urls("https://api.example.com/"),
            vec![
                "https://api.example.com/v1/models".to_string(),
                "https://api.example.com/models".to_string()
            ]
        );
        assert_eq!(
            build_models_urls("https://api.example.com/v1"),
            vec!["https://api.example.com/v1/models".to_string()]
        );
        assert_eq!(
            build_models_urls("https://api.example.com/v1/models"),
            vec!["https://api.example.com/v1/models".to_string()]
        );
        assert!(build_models_urls("  ").is_empty());
    }

    #[test]
    fn test_parse_dedupes_and_sorts() {
        let payload = json!({
            "data": [
                { "id": "z-model", "owned_by": "a" },
                { "id": " a-model ", "owned_by": "b" },
                { "id": "z-model", "owned_by": "c" },
                { "id": "" },
                { "name": "invalid" }
            ]
        });

        let parsed = parse_models_from_payload(payload).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "a-model");
        assert_eq!(parsed[1].id, "z-model");
        assert_eq!(parsed[1].owned_by.as_deref(), Some("a"));
    }

    #[test]
    fn test_parse_accepts_missing_data() {
        assert!(parse_models_from_payload(json!({})).unwrap().is_empty());
        assert!(parse_models_from_payload(json!({ "data": [] })).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_models_from_payload(json!({ "data": "nope" })),
            Err(Error::Serialization(_))
        ));
    }
}
