use thiserror::Error;

use crate::response::Row;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("row template failed on row {ordinal}: {message}")]
    Template { ordinal: usize, message: String },
}

/// Per-row transform from a parsed row to markup.
///
/// Any `Fn(&Row) -> String` closure is a template.
pub trait RowTemplate: Send + Sync {
    fn render(&self, row: &Row) -> Result<String, RenderError>;
}

impl<F> RowTemplate for F
where
    F: Fn(&Row) -> String + Send + Sync,
{
    fn render(&self, row: &Row) -> Result<String, RenderError> {
        Ok(self(row))
    }
}

/// Destination for rendered markup.
///
/// Targets are shared between the caller and the pipeline, so appending
/// goes through `&self`.
pub trait RenderTarget: Send + Sync {
    /// Tabular targets receive header and body markup as separate row groups.
    fn is_tabular(&self) -> bool;

    fn append(&self, header: &str, body: &str);
}
