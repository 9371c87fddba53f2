//! HTTP transport shared by the probe client and the model fetcher.

pub mod http;

pub use http::{compact_error_tail, map_http_status_error, map_request_error, HttpTransport};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
