//! Callback-wrapped transport
//!
//! Asks the service to wrap its JSON in `name(...);` and unwraps it again.
//! Every request gets a fresh callback name so responses can't be mixed up.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::http::{HttpClient, HttpConfig, decode_json};
use super::url::request_url;
use super::{PreparedRequest, Result, Transport, TransportError, TransportKind};
use crate::options::RequestOptions;

pub const DEFAULT_CALLBACK_PREFIX: &str = "_sheetpull_callback_";

#[derive(Debug)]
pub struct CallbackTransport {
    client: HttpClient,
    prefix: String,
    counter: AtomicU64,
}

impl CallbackTransport {
    pub fn new(config: &HttpConfig, prefix: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        })
    }

    fn next_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

#[async_trait]
impl Transport for CallbackTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Callback
    }

    fn prepare(&self, request: &RequestOptions) -> PreparedRequest {
        let name = self.next_name();
        PreparedRequest {
            url: request_url(request, Some(&name)),
            callback: Some(name),
        }
    }

    async fn send(&self, prepared: &PreparedRequest) -> Result<Value> {
        let name = prepared
            .callback
            .as_deref()
            .ok_or_else(|| TransportError::CallbackNotInvoked(String::new()))?;

        let body = self.client.get(&prepared.url, &[]).await?;
        let text = std::str::from_utf8(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        let inner = unwrap_invocation(text, name)
            .ok_or_else(|| TransportError::CallbackNotInvoked(name.to_string()))?;
        debug!(callback = name, "Callback invoked");

        decode_json(inner.as_bytes())
    }
}

/// Extract the argument of `name(...)` from a script body.
///
/// Leading comments such as `/*O_o*/` and a trailing `;` are tolerated.
pub fn unwrap_invocation<'a>(script: &'a str, name: &str) -> Option<&'a str> {
    let start = script.find(name)?;
    let rest = script[start + name.len()..].trim_start();
    let rest = rest.strip_prefix('(')?;

    let rest = rest.trim_end();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    rest.strip_suffix(')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RequestIdentity;

    fn request() -> RequestOptions {
        RequestOptions {
            endpoint: "https://spreadsheets.google.com/tq?key=abc&".into(),
            key: "abc".into(),
            gid: "2".into(),
            query: String::new(),
            identity: RequestIdentity::new("abc", "2", ""),
            url: None,
        }
    }

    #[test]
    fn test_callback_names_are_unique() {
        let transport = CallbackTransport::new(&HttpConfig::default(), "_cb_").unwrap();

        let first = transport.prepare(&request());
        let second = transport.prepare(&request());

        assert_eq!(first.callback.as_deref(), Some("_cb_0"));
        assert_eq!(second.callback.as_deref(), Some("_cb_1"));
        assert!(first.url.ends_with("&tqx=responseHandler:_cb_0"));
        assert_eq!(transport.kind(), TransportKind::Callback);
    }

    #[test]
    fn test_unwrap_invocation() {
        let script = "/*O_o*/\n_cb_0({\"status\":\"ok\"});";
        assert_eq!(unwrap_invocation(script, "_cb_0"), Some("{\"status\":\"ok\"}"));

        assert_eq!(unwrap_invocation("_cb_1({})", "_cb_1"), Some("{}"));
        assert_eq!(unwrap_invocation("_cb_1({})", "_cb_2"), None);
        assert_eq!(unwrap_invocation("_cb_1 = {}", "_cb_1"), None);
    }
}
