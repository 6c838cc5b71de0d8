//! Wire models for the query service response.
//!
//! ```json
//! {
//!   "version": "0.6",
//!   "status": "ok",
//!   "warnings": [{ "reason": "...", "message": "...", "detailed_message": "..." }],
//!   "table": {
//!     "cols": [{ "id": "A", "label": "Name", "type": "string" }],
//!     "rows": [{ "c": [{ "v": "Ada" }, null, { "v": [1, 2], "f": "1-2" }] }]
//!   }
//! }
//! ```
//!
//! Each cell carries a raw value `v` and optionally a formatted display
//! value `f`. Cells may be `null`, and rows may lack `c` entirely.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Table {
    pub cols: Vec<Column>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Column {
    /// Column letter (`A`, `B`, ...)
    #[serde(default)]
    pub id: String,
    /// Label the service extracted from a header row, if any
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Column {
    /// The label without any whitespace; `None` when absent or blank.
    pub fn label(&self) -> Option<String> {
        let label: String = self
            .label
            .as_deref()?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        (!label.is_empty()).then_some(label)
    }

    pub fn label_or_letter(&self) -> String {
        self.label().unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TableRow {
    #[serde(default)]
    pub c: Option<Vec<Option<Cell>>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Cell {
    #[serde(default)]
    pub v: Value,
    #[serde(default)]
    pub f: Option<String>,
}

/// One parsed row. Ordinal 0 is the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub ordinal: usize,
    /// Cell values keyed by column label, in column order
    pub cells: IndexMap<String, String>,
}

impl Row {
    pub fn is_header(&self) -> bool {
        self.ordinal == 0
    }
}

/// Facts about one payload, derived before its rows are parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseAttributes {
    /// Number of payload rows to use after trimming to the chunk size
    pub last: usize,
    /// 1 when the service extracted column labels from a header row
    pub header: usize,
    /// Column labels used as row cell keys
    pub labels: Vec<String>,
}
