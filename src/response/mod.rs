//! Response normalization
//!
//! Converts the semi-structured table payload into flat [`Row`] records and
//! updates the status cache with paging progress.

mod models;
mod normalizer;

pub use models::{Cell, Column, ResponseAttributes, Row, Table, TableRow};
pub use normalizer::{Normalizer, cell_value, ordinal, response_attributes};
