//! Request status cache
//!
//! Tracks, per request identity, whether a query has been fully loaded,
//! whether a previous request failed, and the row offset of the next chunk.
//!
//! ## Lifetime
//!
//! Entries are created lazily and are never evicted. A long-running process
//! that issues many distinct queries grows the cache for as long as it lives;
//! this tool is meant for short-lived, client-side use where that is acceptable.
//!
//! ## Sharing
//!
//! [`StatusCache::shared`] is the process-wide cache. Every caller holding it
//! sees the same paging state for the same identity, so callers must not
//! assume isolation. Tests and embedders that want isolation construct their
//! own cache with [`StatusCache::default`] or inject a store with
//! [`StatusCache::new`].
//!
//! Every change goes through [`StatusStore::update`], which applies it under
//! the store's lock, so concurrent writers to one identity never lose an
//! update. [`StatusCache::advance_offset`] reserves a chunk atomically: two
//! concurrent chunked calls get consecutive offsets. Completion and failure
//! still arrive in whatever order the responses do, so callers that need
//! rows in order should still issue chunked calls one at a time.

mod store;

pub use store::{MemoryStatusStore, StatusStore};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static SHARED: Lazy<StatusCache> = Lazy::new(StatusCache::default);

/// Identity of a logical query against a logical sheet.
///
/// Two requests with the same key, gid and query text share paging and
/// failure state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestIdentity {
    pub key: String,
    pub gid: String,
    pub query: String,
}

impl RequestIdentity {
    pub fn new(key: impl Into<String>, gid: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            gid: gid.into(),
            query: query.into(),
        }
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.key, self.gid, self.query)
    }
}

/// Paging and failure state of one request identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    pub loaded: bool,
    pub failed: bool,
    pub offset: usize,
}

/// Handle to a status store. Cloning shares the underlying store.
#[derive(Clone)]
pub struct StatusCache {
    store: Arc<dyn StatusStore>,
}

impl StatusCache {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// The process-wide cache
    pub fn shared() -> Self {
        SHARED.clone()
    }

    /// Current state; absent identities read as defaults.
    pub fn get(&self, identity: &RequestIdentity) -> RequestState {
        self.store.load(identity).unwrap_or_default()
    }

    pub fn set_loaded(&self, identity: &RequestIdentity, loaded: bool) {
        self.update(identity, |state| state.loaded = loaded);
    }

    pub fn set_failed(&self, identity: &RequestIdentity, failed: bool) {
        self.update(identity, |state| state.failed = failed);
    }

    pub fn set_offset(&self, identity: &RequestIdentity, offset: usize) {
        self.update(identity, |state| state.offset = offset);
    }

    /// Move the offset forward by `by` and return where it was.
    pub fn advance_offset(&self, identity: &RequestIdentity, by: usize) -> usize {
        self.update(identity, |state| state.offset += by).offset
    }

    pub fn reset(&self, identity: &RequestIdentity) {
        self.store.save(identity, RequestState::default());
        debug!(%identity, "Request status reset");
    }

    fn update(
        &self,
        identity: &RequestIdentity,
        mut apply: impl FnMut(&mut RequestState),
    ) -> RequestState {
        let mut current = RequestState::default();
        let previous = self.store.update(identity, &mut |state: &mut RequestState| {
            apply(state);
            current = *state;
        });
        debug!(
            %identity,
            loaded = current.loaded,
            failed = current.failed,
            offset = current.offset,
            "Request status updated"
        );
        previous
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStatusStore::new()))
    }
}

impl fmt::Debug for StatusCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusCache").finish_non_exhaustive()
    }
}
