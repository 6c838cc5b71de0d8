//! Request options
//!
//! Options arrive either as a loosely typed [`OptionBag`] (from JSON, TOML,
//! the environment or the CLI) or as typed [`SheetOptions`]. Legacy names and
//! bad numbers are fixed once, when the bag is deserialized; everything after
//! that works on typed values.
//!
//! Resolution runs in a fixed order and fails fast:
//! 1. locate the sheet from the URL (`MalformedUrl`)
//! 2. derive the request identity
//! 3. reset cached status if requested
//! 4. read the row offset and reserve the next chunk
//! 5. validate output, key/gid and cached status
//!
//! Steps 1-4 are [`OptionResolver::resolve`], step 5 is
//! [`OptionResolver::validate`]. Neither performs network activity.

mod models;
mod resolver;
mod validation;

pub use models::{
    HTML_TEMPLATE, OptionBag, RequestOptions, ResolvedOptions, SheetOptions, coerce_natural,
    parse_natural,
};
pub use resolver::{OptionResolver, RESET_MESSAGE};
pub use crate::status::RequestIdentity;
