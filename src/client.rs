//! Sheet client: the request pipeline and its single error sink
//!
//! A call runs resolve, validate, send, normalize and render in order. Every
//! outcome is returned to the caller and, when the options carry a callback,
//! handed to that callback as well.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SheetError;
use crate::locator::{GvizLocator, SheetLocator};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::options::{OptionBag, OptionResolver, ResolvedOptions, SheetOptions};
use crate::render::render_rows;
use crate::response::{Normalizer, Row};
use crate::status::{RequestIdentity, RequestState, StatusCache};
use crate::transport::{Transport, TransportError, build_transport};

/// Caller hook receiving the outcome of each call
pub type Callback = Arc<dyn Fn(Result<&SheetResponse, &SheetFailure>) + Send + Sync>;

/// Successful outcome of a call
#[derive(Debug, Clone)]
pub struct SheetResponse {
    pub options: ResolvedOptions,
    pub payload: Value,
    pub rows: Vec<Row>,
    pub markup: String,
}

/// Failed outcome of a call
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SheetFailure {
    pub error: SheetError,
    /// Present once the options were resolved.
    pub options: Option<ResolvedOptions>,
    /// Present when the payload arrived but could not be used.
    pub payload: Option<Value>,
}

#[derive(Clone)]
pub struct SheetClient {
    transport: Arc<dyn Transport>,
    cache: StatusCache,
    locator: Arc<dyn SheetLocator>,
    defaults: OptionBag,
    metrics: Arc<Metrics>,
}

impl SheetClient {
    /// Client over the process-wide status cache.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: StatusCache::shared(),
            locator: Arc::new(GvizLocator),
            defaults: OptionBag::default(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Client with the configured transport and option defaults.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = build_transport(
            config.transport.kind,
            &config.http.to_http_config(),
            &config.transport.callback_prefix,
        )?;

        Ok(Self::new(transport).with_defaults(config.defaults.clone()))
    }

    pub fn with_status_cache(mut self, cache: StatusCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_locator(mut self, locator: Arc<dyn SheetLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_defaults(mut self, defaults: OptionBag) -> Self {
        self.defaults = defaults;
        self
    }

    /// Typed options from a bag laid over this client's defaults.
    pub fn options(&self, bag: OptionBag) -> SheetOptions {
        SheetOptions::from_bag(bag.merge(&self.defaults))
    }

    /// Fetch the next chunk (or everything, when unchunked) for `options`.
    pub async fn fetch(&self, options: SheetOptions) -> Result<SheetResponse, SheetFailure> {
        let callback = options.callback.clone();
        let outcome = self.execute(options, None).await;
        deliver(callback.as_ref(), &outcome);
        outcome
    }

    /// Run the pipeline against a payload the caller already has.
    ///
    /// Paging and failure state are tracked exactly as for [`fetch`](Self::fetch),
    /// but no request is sent.
    pub async fn load(
        &self,
        options: SheetOptions,
        payload: Value,
    ) -> Result<SheetResponse, SheetFailure> {
        let callback = options.callback.clone();
        let outcome = self.execute(options, Some(payload)).await;
        deliver(callback.as_ref(), &outcome);
        outcome
    }

    pub fn status(&self, identity: &RequestIdentity) -> RequestState {
        self.cache.get(identity)
    }

    pub fn reset(&self, identity: &RequestIdentity) {
        self.cache.reset(identity);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn execute(
        &self,
        options: SheetOptions,
        bootstrap: Option<Value>,
    ) -> Result<SheetResponse, SheetFailure> {
        let resolver = OptionResolver::new(&self.cache, self.locator.as_ref());

        let mut resolved = match resolver.resolve(options) {
            Ok(resolved) => resolved,
            Err(error) => return Err(self.rejected(error, None)),
        };

        if let Err(error) = resolver.validate(&resolved) {
            return Err(self.rejected(error, Some(resolved)));
        }

        let payload = match bootstrap {
            Some(payload) => payload,
            None => {
                let prepared = self.transport.prepare(&resolved.request);
                resolved.request.url = Some(prepared.url.clone());

                info!(
                    identity = %resolved.identity(),
                    url = %prepared.url,
                    offset = resolved.offset,
                    "Dispatching request"
                );
                self.metrics.request_dispatched();

                match self.transport.send(&prepared).await {
                    Ok(payload) => payload,
                    Err(error) => return Err(self.failed(error.into(), resolved, None)),
                }
            }
        };

        let rows = match Normalizer::new(&self.cache).normalize(&mut resolved, &payload) {
            Ok(rows) => rows,
            Err(error) => return Err(self.failed(error, resolved, Some(payload))),
        };
        self.metrics
            .rows_parsed(rows.iter().filter(|row| !row.is_header()).count());

        let rendered = match render_rows(&resolved, &rows) {
            Ok(rendered) => rendered,
            Err(error) => return Err(self.failed(error.into(), resolved, Some(payload))),
        };

        debug!(identity = %resolved.identity(), rows = rows.len(), "Request complete");

        Ok(SheetResponse {
            options: resolved,
            payload,
            rows,
            markup: rendered.markup,
        })
    }

    /// Validation failures leave the status cache alone.
    fn rejected(&self, error: SheetError, options: Option<ResolvedOptions>) -> SheetFailure {
        debug!(code = error.code(), %error, "Request rejected");
        self.metrics.request_rejected();

        SheetFailure {
            error,
            options,
            payload: None,
        }
    }

    /// Anything after validation marks the identity failed.
    fn failed(
        &self,
        error: SheetError,
        options: ResolvedOptions,
        payload: Option<Value>,
    ) -> SheetFailure {
        warn!(identity = %options.identity(), code = error.code(), %error, "Request failed");
        self.cache.set_failed(options.identity(), true);
        self.metrics.request_failed();

        SheetFailure {
            error,
            options: Some(options),
            payload,
        }
    }
}

fn deliver(callback: Option<&Callback>, outcome: &Result<SheetResponse, SheetFailure>) {
    if let Some(callback) = callback {
        callback(outcome.as_ref());
    }
}
