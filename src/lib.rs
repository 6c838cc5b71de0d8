pub mod client;
pub mod config;
pub mod error;
pub mod humanize;
pub mod locator;
pub mod observability;
pub mod options;
pub mod render;
pub mod response;
pub mod status;
pub mod transport;

pub use client::{SheetClient, SheetFailure, SheetResponse};
pub use error::SheetError;
pub use options::{OptionBag, SheetOptions};
