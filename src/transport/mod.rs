//! Request transports
//!
//! A [`Transport`] turns resolved request options into a fetch URL and
//! retrieves the JSON payload behind it. Two are provided: [`HttpTransport`]
//! fetches the JSON directly, [`CallbackTransport`] asks for a callback
//! wrapped script and unwraps it.

mod callback;
mod http;
mod url;

pub use callback::{CallbackTransport, DEFAULT_CALLBACK_PREFIX, unwrap_invocation};
pub use http::{HttpClient, HttpConfig, HttpTransport, decode_json};
pub use url::{encode_component, request_url};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::options::RequestOptions;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("callback '{0}' was never invoked")]
    CallbackNotInvoked(String),

    #[error("invalid payload: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Direct,
    Callback,
}

/// A request ready to go out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    /// Name the response is expected to be wrapped in, if any.
    pub callback: Option<String>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Build the fetch URL. Called once per dispatched request.
    fn prepare(&self, request: &RequestOptions) -> PreparedRequest;

    /// Retrieve and decode the payload. Exactly one attempt is made.
    async fn send(&self, prepared: &PreparedRequest) -> Result<Value>;
}

/// Build the configured transport.
pub fn build_transport(
    kind: TransportKind,
    http: &HttpConfig,
    callback_prefix: &str,
) -> Result<Arc<dyn Transport>> {
    Ok(match kind {
        TransportKind::Direct => Arc::new(HttpTransport::new(http)?),
        TransportKind::Callback => Arc::new(CallbackTransport::new(http, callback_prefix)?),
    })
}
