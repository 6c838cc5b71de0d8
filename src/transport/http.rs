//! Direct HTTP transport

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::url::request_url;
use super::{PreparedRequest, Result, Transport, TransportError, TransportKind};
use crate::options::RequestOptions;

/// Some sheets prefix their JSON with this guard line.
const JSON_GUARD: &str = ")]}'";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: concat!("sheetpull/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy: None,
        }
    }
}

/// Plain GET client shared by both transports
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(url) = &config.proxy {
            let proxy = Proxy::all(url).map_err(|e| TransportError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// One GET; no retries. Anything but 200 OK is an error.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Bytes> {
        debug!(url, "Sending request");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else if e.is_redirect() {
                TransportError::TooManyRedirects
            } else {
                TransportError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = bytes.len(), "Response received");

        Ok(bytes)
    }
}

/// Fetches the JSON payload directly
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    fn prepare(&self, request: &RequestOptions) -> PreparedRequest {
        PreparedRequest {
            url: request_url(request, None),
            callback: None,
        }
    }

    async fn send(&self, prepared: &PreparedRequest) -> Result<Value> {
        let body = self
            .client
            .get(&prepared.url, &[("X-DataSource-Auth", "true")])
            .await?;
        decode_json(&body)
    }
}

/// Decode a JSON body, dropping the guard line if present.
pub fn decode_json(body: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(body).map_err(|e| TransportError::Decode(e.to_string()))?;
    let text = match text.strip_prefix(JSON_GUARD) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => text,
    };
    serde_json::from_str(text).map_err(|e| TransportError::Decode(e.to_string()))
}
