use tracing::debug;

use super::models::{RequestOptions, ResolvedOptions, SheetOptions};
use super::validation;
use crate::error::SheetError;
use crate::locator::SheetLocator;
use crate::status::{RequestIdentity, StatusCache};

pub const RESET_MESSAGE: &str = "Request status has been reset.";

/// Turns user options into a resolved request and computes the paging window
/// for the next fetch.
pub struct OptionResolver<'a> {
    cache: &'a StatusCache,
    locator: &'a dyn SheetLocator,
}

impl<'a> OptionResolver<'a> {
    pub fn new(cache: &'a StatusCache, locator: &'a dyn SheetLocator) -> Self {
        Self { cache, locator }
    }

    /// Locate the sheet, derive the request identity and reserve the next chunk.
    ///
    /// When chunking, the query asks for one row more than the chunk size: the
    /// service rejects offsets past the end of the data, so the extra row is
    /// how the normalizer tells a full chunk from the last one. The stored
    /// offset advances by the chunk size only.
    pub fn resolve(&self, options: SheetOptions) -> Result<ResolvedOptions, SheetError> {
        let location = self
            .locator
            .locate(&options.url)
            .ok_or_else(|| SheetError::MalformedUrl(options.url.clone()))?;

        let identity = RequestIdentity::new(&location.key, &location.gid, &options.query);
        let mut messages = Vec::new();

        if options.reset {
            self.cache.reset(&identity);
            messages.push(RESET_MESSAGE.to_string());
        }

        let mut query = options.query.clone();
        let offset = if options.chunk_size > 0 {
            let offset = self.cache.advance_offset(&identity, options.chunk_size);
            query.push_str(&format!(
                " limit {} offset {}",
                options.chunk_size + 1,
                offset
            ));
            offset
        } else {
            self.cache.get(&identity).offset
        };

        debug!(%identity, offset, chunk_size = options.chunk_size, "Resolved request options");

        Ok(ResolvedOptions {
            user: options,
            offset,
            request: RequestOptions {
                endpoint: location.endpoint,
                key: location.key,
                gid: location.gid,
                query,
                identity,
                url: None,
            },
            response: None,
            debug: messages,
        })
    }

    /// Reject requests that cannot or should not be sent.
    pub fn validate(&self, resolved: &ResolvedOptions) -> Result<(), SheetError> {
        let state = self.cache.get(resolved.identity());
        validation::validate(resolved, &state)
    }
}
