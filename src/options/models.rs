use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::client::{Callback, SheetFailure, SheetResponse};
use crate::render::{HtmlRowTemplate, RenderTarget, RowTemplate};
use crate::response::ResponseAttributes;
use crate::status::RequestIdentity;

/// Name of the built-in row template in option bags
pub const HTML_TEMPLATE: &str = "html";

/// Loosely typed request options, as they arrive from JSON, TOML, the
/// environment or the command line.
///
/// Every field is optional so a bag can be laid over another one. Legacy
/// option names are accepted as aliases:
///
/// - `sql` for `query`
/// - `resetStatus` / `reset_status` for `reset`
/// - `rowHandler` / `row_handler` / `rowTemplate` for `row_template`
///
/// `chunk_size` and `headers` accept anything and coerce it to a natural
/// number: `"12"` and `12.7` become 12, negatives and junk become 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionBag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, alias = "sql", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(
        default,
        alias = "chunkSize",
        deserialize_with = "natural_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub chunk_size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Template name; only `"html"` is built in.
    #[serde(
        default,
        alias = "rowTemplate",
        alias = "rowHandler",
        alias = "row_handler",
        skip_serializing_if = "Option::is_none"
    )]
    pub row_template: Option<String>,

    #[serde(
        default,
        deserialize_with = "natural_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub headers: Option<usize>,

    #[serde(
        default,
        alias = "resetStatus",
        alias = "reset_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub reset: Option<bool>,
}

impl OptionBag {
    /// Lay `self` over `defaults`: fields set here win.
    pub fn merge(self, defaults: &OptionBag) -> OptionBag {
        OptionBag {
            url: self.url.or_else(|| defaults.url.clone()),
            query: self.query.or_else(|| defaults.query.clone()),
            chunk_size: self.chunk_size.or(defaults.chunk_size),
            labels: self.labels.or_else(|| defaults.labels.clone()),
            row_template: self.row_template.or_else(|| defaults.row_template.clone()),
            headers: self.headers.or(defaults.headers),
            reset: self.reset.or(defaults.reset),
        }
    }
}

fn natural_number<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_natural))
}

/// Coerce any JSON value to a natural number, clamping at zero.
pub fn coerce_natural(value: &Value) -> usize {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                usize::try_from(n).unwrap_or(usize::MAX)
            } else if let Some(f) = number.as_f64() {
                if f.is_finite() && f > 0.0 { f.trunc() as usize } else { 0 }
            } else {
                0
            }
        }
        Value::String(text) => parse_natural(text),
        _ => 0,
    }
}

/// Parse the leading integer of a string, clamping at zero.
///
/// Leading whitespace and a sign are allowed; parsing stops at the first
/// non-digit. Strings without leading digits yield 0.
pub fn parse_natural(text: &str) -> usize {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: usize = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(usize::from(byte - b'0'));
    }

    if negative { 0 } else { value }
}

/// Typed options for a single request.
///
/// Built from an [`OptionBag`] with [`SheetOptions::from_bag`], or directly
/// with the `with_*` methods. A request needs somewhere to deliver its
/// output: a `target`, a `callback`, or both.
#[derive(Clone, Default)]
pub struct SheetOptions {
    pub url: String,
    pub query: String,
    pub target: Option<Arc<dyn RenderTarget>>,
    /// Rows per chunk; 0 fetches everything in one request.
    pub chunk_size: usize,
    /// Overrides the returned column labels when the counts match.
    pub labels: Vec<String>,
    pub row_template: Option<Arc<dyn RowTemplate>>,
    pub callback: Option<Callback>,
    /// Header rows in the source to exclude from row numbering.
    pub headers: usize,
    pub reset: bool,
}

impl SheetOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Apply documented defaults to a merged bag.
    pub fn from_bag(bag: OptionBag) -> Self {
        let row_template: Option<Arc<dyn RowTemplate>> = match bag.row_template.as_deref() {
            None => None,
            Some(HTML_TEMPLATE) => Some(Arc::new(HtmlRowTemplate)),
            Some(other) => {
                warn!(template = other, "Unknown row template, using default");
                None
            }
        };

        Self {
            url: bag.url.unwrap_or_default(),
            query: bag.query.unwrap_or_default(),
            target: None,
            chunk_size: bag.chunk_size.unwrap_or(0),
            labels: bag.labels.unwrap_or_default(),
            row_template,
            callback: None,
            headers: bag.headers.unwrap_or(0),
            reset: bag.reset.unwrap_or(false),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_headers(mut self, headers: usize) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_target(mut self, target: Arc<dyn RenderTarget>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_row_template(mut self, template: Arc<dyn RowTemplate>) -> Self {
        self.row_template = Some(template);
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Result<&SheetResponse, &SheetFailure>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for SheetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetOptions")
            .field("url", &self.url)
            .field("query", &self.query)
            .field("target", &self.target.is_some())
            .field("chunk_size", &self.chunk_size)
            .field("labels", &self.labels)
            .field("row_template", &self.row_template.is_some())
            .field("callback", &self.callback.is_some())
            .field("headers", &self.headers)
            .field("reset", &self.reset)
            .finish()
    }
}

/// Request fields derived from the user options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    pub endpoint: String,
    pub key: String,
    pub gid: String,
    /// Query text sent to the service, including any paging clause.
    pub query: String,
    pub identity: RequestIdentity,
    /// Set once the transport has built the fetch URL.
    pub url: Option<String>,
}

/// Per-call snapshot of everything known about a request
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub user: SheetOptions,
    /// Row offset this call starts at.
    pub offset: usize,
    pub request: RequestOptions,
    /// Filled in once a payload has been examined.
    pub response: Option<ResponseAttributes>,
    /// Diagnostic messages gathered along the way.
    pub debug: Vec<String>,
}

impl ResolvedOptions {
    pub fn identity(&self) -> &RequestIdentity {
        &self.request.identity
    }
}
