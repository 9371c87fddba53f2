//! HTTP probe client against a local mock provider.

use provider_probe::config::{ApiFormat, ProbeConfig, ProbeSettings, ProviderConfig};
use provider_probe::probe::{AppId, HttpProbeClient, ProbeClient, ProbeResult, ProbeStatus};
use provider_probe::transport::HttpTransport;
use provider_probe::Error;
use std::sync::Arc;
use std::time::Duration;

const OK_CHUNK: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"h\"}}]}\n\n";

fn client_for(provider: ProviderConfig, degraded_ms: u64) -> HttpProbeClient {
    let settings = ProbeSettings {
        probe: ProbeConfig::new().with_degraded_threshold(Duration::from_millis(degraded_ms)),
        ..ProbeSettings::default()
    }
    .with_provider(&AppId::new("claude"), provider);
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpProbeClient::with_transport(
        Arc::new(settings),
        HttpTransport::from_client(http, Duration::from_secs(5)),
    )
}

#[tokio::test]
async fn test_openai_stream_is_operational() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_header("accept", "text/event-stream")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(OK_CHUNK)
        .create_async()
        .await;

    let client = client_for(
        ProviderConfig::new("relay", server.url(), "gpt-4o-mini").with_api_key("sk-test"),
        6000,
    );
    let result = client.probe(&AppId::new("claude"), "relay").await.unwrap();

    assert_eq!(result.status(), ProbeStatus::Operational);
    assert!(result.response_time_ms().is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_anthropic_headers_and_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("event: message_start\ndata: {\"type\":\"message_start\"}\n\n")
        .create_async()
        .await;

    let client = client_for(
        ProviderConfig::new("direct", format!("{}/v1", server.url()), "claude-3-haiku")
            .with_format(ApiFormat::Anthropic)
            .with_api_key("sk-ant"),
        6000,
    );
    let result = client.probe(&AppId::new("claude"), "direct").await.unwrap();

    assert_eq!(result.status(), ProbeStatus::Operational);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_slow_first_chunk_is_degraded() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(80));
            w.write_all(OK_CHUNK.as_bytes())
        })
        .create_async()
        .await;

    let client = client_for(
        ProviderConfig::new("relay", server.url(), "gpt-4o-mini").with_api_key("sk-test"),
        10,
    );
    let result = client.probe(&AppId::new("claude"), "relay").await.unwrap();

    assert_eq!(result.status(), ProbeStatus::Degraded);
    assert!(result.response_time_ms().unwrap() > 10);
}

#[tokio::test]
async fn test_unauthorized_is_failed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body("{\"error\":{\"message\":\"invalid key\"}}")
        .create_async()
        .await;

    let client = client_for(
        ProviderConfig::new("relay", server.url(), "gpt-4o-mini").with_api_key("sk-bad"),
        6000,
    );
    let result = client.probe(&AppId::new("claude"), "relay").await.unwrap();

    assert_eq!(result.status(), ProbeStatus::Failed);
    assert!(result.message().unwrap().contains("401"));
}

#[tokio::test]
async fn test_error_event_in_first_chunk_is_failed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("data: {\"error\":{\"message\":\"model not found\"}}\n\n")
        .create_async()
        .await;

    let client = client_for(
        ProviderConfig::new("relay", server.url(), "no-such-model").with_api_key("sk-test"),
        6000,
    );
    let result = client.probe(&AppId::new("claude"), "relay").await.unwrap();

    assert_eq!(result, ProbeResult::failed("model not found"));
}

#[tokio::test]
async fn test_unknown_provider_is_an_error() {
    let client = client_for(
        ProviderConfig::new("relay", "http://127.0.0.1:9", "gpt-4o-mini").with_api_key("sk"),
        6000,
    );

    let err = client
        .probe(&AppId::new("claude"), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));

    let err = client
        .probe(&AppId::new("codex"), "relay")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_failed_not_error() {
    let client = client_for(
        ProviderConfig::new("relay", "http://127.0.0.1:9", "gpt-4o-mini").with_api_key("sk"),
        6000,
    );

    let result = client.probe(&AppId::new("claude"), "relay").await.unwrap();
    assert_eq!(result.status(), ProbeStatus::Failed);
}
