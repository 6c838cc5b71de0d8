use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{Cell, ResponseAttributes, Row, Table};
use crate::error::SheetError;
use crate::options::{ResolvedOptions, SheetOptions};
use crate::status::StatusCache;

/// Turns a raw payload into rows and records paging progress
pub struct Normalizer<'a> {
    cache: &'a StatusCache,
}

impl<'a> Normalizer<'a> {
    pub fn new(cache: &'a StatusCache) -> Self {
        Self { cache }
    }

    /// Parse `raw` into rows: a header row when this is the first chunk,
    /// then one row per payload row that has cell data.
    ///
    /// Embedded warnings and errors go to `options.debug` even when the
    /// payload turns out to be unusable.
    pub fn normalize(
        &self,
        options: &mut ResolvedOptions,
        raw: &Value,
    ) -> Result<Vec<Row>, SheetError> {
        for state in ["warnings", "errors"] {
            for message in embedded_messages(raw, state) {
                warn!(identity = %options.identity(), state, %message, "Message in response");
                options.debug.push(message);
            }
        }

        let table = parse_table(raw)?;
        let attributes = response_attributes(&options.user, &table);

        // One row more than the chunk size was requested; fewer rows than the
        // chunk size means the data ran out.
        let chunk_size = options.user.chunk_size;
        let loaded = chunk_size == 0 || attributes.last < chunk_size;
        self.cache.set_loaded(options.identity(), loaded);

        let rows = parse_rows(options.offset, options.user.headers, &attributes, &table);
        debug!(
            identity = %options.identity(),
            rows = rows.len(),
            loaded,
            "Normalized response"
        );

        options.response = Some(attributes);
        Ok(rows)
    }
}

/// Message text from a root-level `warnings`/`errors` array
fn embedded_messages(raw: &Value, state: &str) -> Vec<String> {
    let Some(entries) = raw.get(state).and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            entry
                .get("detailed_message")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .collect()
}

fn present(value: &Value, field: &str) -> bool {
    value.get(field).is_some_and(|v| !v.is_null())
}

fn parse_table(raw: &Value) -> Result<Table, SheetError> {
    if !(present(raw, "status") && present(raw, "table")) {
        return Err(SheetError::UnexpectedFormat);
    }

    let table = &raw["table"];
    if !(present(table, "cols") && present(table, "rows")) {
        return Err(SheetError::UnexpectedFormat);
    }

    Ok(serde_json::from_value(table.clone())?)
}

/// Caller labels win only when they cover every column.
pub fn response_attributes(options: &SheetOptions, table: &Table) -> ResponseAttributes {
    let row_count = table.rows.len();
    let last = match options.chunk_size {
        0 => row_count,
        chunk_size => row_count.min(chunk_size),
    };

    let header = usize::from(table.cols.iter().any(|col| col.label().is_some()));

    let labels = if options.labels.len() == table.cols.len() {
        options.labels.clone()
    } else {
        table.cols.iter().map(|col| col.label_or_letter()).collect()
    };

    ResponseAttributes {
        last,
        header,
        labels,
    }
}

fn parse_rows(
    offset: usize,
    headers: usize,
    attributes: &ResponseAttributes,
    table: &Table,
) -> Vec<Row> {
    let mut output = Vec::with_capacity(attributes.last + 1);

    // The header row belongs to the first chunk of a paging sequence only.
    if offset == 0 {
        output.push(Row {
            ordinal: 0,
            cells: attributes
                .labels
                .iter()
                .map(|label| (label.clone(), label.clone()))
                .collect(),
        });
    }

    for (index, row) in table.rows.iter().enumerate().take(attributes.last) {
        let Some(cells) = &row.c else {
            continue;
        };

        let mut values = IndexMap::with_capacity(cells.len());
        for (label, cell) in attributes.labels.iter().zip(cells) {
            values.insert(label.clone(), cell_value(cell.as_ref()));
        }

        output.push(Row {
            ordinal: ordinal(offset, index, attributes.header, headers),
            cells: values,
        });
    }

    output
}

/// Caller-visible row number: `max(0, offset + index + 1 + header - headers)`.
///
/// When `headers` exceeds `header + 1` the first rows of a sequence all clamp
/// to 0 and collide with the header ordinal. That is preserved as is.
pub fn ordinal(offset: usize, index: usize, header: usize, headers: usize) -> usize {
    (offset + index + 1 + header).saturating_sub(headers)
}

/// Display text of a cell, trimmed of leading and trailing spaces.
///
/// Array values prefer the formatted value and otherwise join their
/// elements. Scalars render as text; missing cells and nulls are empty.
pub fn cell_value(cell: Option<&Cell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };

    let text = match (&cell.v, &cell.f) {
        (Value::Array(_), Some(formatted)) => formatted.clone(),
        (Value::Array(items), None) => items.iter().map(value_text).collect(),
        (value, _) => value_text(value),
    };

    text.trim_matches(' ').to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(number) => number_text(number),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Integral floats print without a fraction (`3.0` -> `"3"`).
fn number_text(number: &serde_json::Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RequestOptions;
    use crate::status::RequestIdentity;
    use serde_json::json;

    fn resolved(chunk_size: usize, offset: usize, headers: usize) -> ResolvedOptions {
        ResolvedOptions {
            user: SheetOptions::new("u")
                .with_chunk_size(chunk_size)
                .with_headers(headers),
            offset,
            request: RequestOptions {
                endpoint: "https://example.com/tq?".into(),
                key: "key".into(),
                gid: "0".into(),
                query: String::new(),
                identity: RequestIdentity::new("key", "0", ""),
                url: None,
            },
            response: None,
            debug: Vec::new(),
        }
    }

    fn payload(rows: usize, labelled: bool) -> Value {
        let label = |text: &str| if labelled { json!(text) } else { json!("") };
        let rows: Vec<Value> = (0..rows)
            .map(|i| json!({ "c": [{ "v": format!("a{i}") }, { "v": i as f64 }, null] }))
            .collect();
        json!({
            "version": "0.6",
            "status": "ok",
            "table": {
                "cols": [
                    { "id": "A", "label": label("Name"), "type": "string" },
                    { "id": "B", "label": label("Count"), "type": "number" },
                    { "id": "C", "label": label("Note"), "type": "string" }
                ],
                "rows": rows
            }
        })
    }

    #[test]
    fn test_unchunked_payload() {
        let cache = StatusCache::default();
        let mut options = resolved(0, 0, 0);

        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(2, false)).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_header());
        let keys: Vec<&str> = rows[1].cells.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(rows[1].ordinal, 1);
        assert_eq!(rows[1].cells["A"], "a0");
        assert_eq!(rows[1].cells["B"], "0");
        assert_eq!(rows[1].cells["C"], "");
        assert_eq!(rows[2].ordinal, 2);
        assert!(cache.get(options.identity()).loaded);

        let attributes = options.response.unwrap();
        assert_eq!(attributes.header, 0);
        assert_eq!(attributes.last, 2);
    }

    #[test]
    fn test_full_chunk_is_not_loaded() {
        let cache = StatusCache::default();
        let mut options = resolved(5, 0, 0);

        // chunk + 1 rows come back when more data follows
        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(6, true)).unwrap();

        assert_eq!(rows.len(), 6);
        assert!(!cache.get(options.identity()).loaded);
    }

    #[test]
    fn test_exact_chunk_is_not_loaded() {
        let cache = StatusCache::default();
        let mut options = resolved(5, 0, 0);

        Normalizer::new(&cache).normalize(&mut options, &payload(5, true)).unwrap();
        assert!(!cache.get(options.identity()).loaded);
    }

    #[test]
    fn test_short_chunk_is_loaded() {
        let cache = StatusCache::default();
        let mut options = resolved(5, 40, 0);

        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(3, true)).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| !row.is_header()));
        assert!(cache.get(options.identity()).loaded);
    }

    #[test]
    fn test_ordinals_account_for_offset_and_headers() {
        assert_eq!(ordinal(10, 0, 1, 1), 11);
        assert_eq!(ordinal(0, 0, 0, 0), 1);
        assert_eq!(ordinal(0, 0, 0, 3), 0);
        assert_eq!(ordinal(0, 4, 1, 3), 3);

        let cache = StatusCache::default();
        let mut options = resolved(5, 10, 1);
        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(2, true)).unwrap();
        assert_eq!(rows[0].ordinal, 11);
        assert_eq!(rows[1].ordinal, 12);
    }

    #[test]
    fn test_caller_labels_need_matching_count() {
        let cache = StatusCache::default();

        let mut options = resolved(0, 0, 0);
        options.user.labels = vec!["x".into(), "y".into(), "z".into()];
        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(1, true)).unwrap();
        let keys: Vec<&str> = rows[0].cells.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);

        let mut options = resolved(0, 0, 0);
        options.user.labels = vec!["x".into()];
        let rows = Normalizer::new(&cache).normalize(&mut options, &payload(1, true)).unwrap();
        let keys: Vec<&str> = rows[1].cells.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "Count", "Note"]);
    }

    #[test]
    fn test_rows_without_cells_are_skipped() {
        let cache = StatusCache::default();
        let mut options = resolved(0, 0, 0);
        let raw = json!({
            "status": "ok",
            "table": {
                "cols": [{ "id": "A" }],
                "rows": [{ "c": [{ "v": "x" }] }, {}, { "c": [{ "v": "y" }] }]
            }
        });

        let rows = Normalizer::new(&cache).normalize(&mut options, &raw).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].ordinal, 1);
        assert_eq!(rows[2].ordinal, 3);
        assert_eq!(rows[2].cells["A"], "y");
    }

    #[test]
    fn test_messages_collected_before_format_check() {
        let cache = StatusCache::default();
        let mut options = resolved(0, 0, 0);
        let raw = json!({
            "status": "error",
            "errors": [
                { "reason": "invalid_query", "message": "Invalid query", "detailed_message": "PARSE_ERROR: bad token" },
                { "reason": "other", "message": "Short" }
            ]
        });

        let result = Normalizer::new(&cache).normalize(&mut options, &raw);

        assert!(matches!(result, Err(SheetError::UnexpectedFormat)));
        assert_eq!(options.debug, vec!["PARSE_ERROR: bad token", "Short"]);
    }

    #[test]
    fn test_table_without_rows_is_unexpected() {
        let cache = StatusCache::default();
        let mut options = resolved(0, 0, 0);
        let raw = json!({ "status": "ok", "table": { "cols": [] } });

        let result = Normalizer::new(&cache).normalize(&mut options, &raw);
        assert!(matches!(result, Err(SheetError::UnexpectedFormat)));
    }

    #[test]
    fn test_malformed_table_is_parse_failure() {
        let cache = StatusCache::default();
        let mut options = resolved(0, 0, 0);
        let raw = json!({ "status": "ok", "table": { "cols": "A", "rows": [] } });

        let result = Normalizer::new(&cache).normalize(&mut options, &raw);
        assert!(matches!(result, Err(SheetError::ParseFailure(_))));
    }

    #[test]
    fn test_cell_values() {
        let cell = |value: Value| -> Cell { serde_json::from_value(value).unwrap() };

        assert_eq!(cell_value(Some(&cell(json!({ "v": [1, 2], "f": "1-2" })))), "1-2");
        assert_eq!(cell_value(Some(&cell(json!({ "v": [1, 2] })))), "12");
        assert_eq!(cell_value(None), "");
        assert_eq!(cell_value(Some(&cell(json!({})))), "");
        assert_eq!(cell_value(Some(&cell(json!({ "v": "  padded  " })))), "padded");
        assert_eq!(cell_value(Some(&cell(json!({ "v": "\ttab\t" })))), "\ttab\t");
        assert_eq!(cell_value(Some(&cell(json!({ "v": 3.0, "f": "3.00" })))), "3");
        assert_eq!(cell_value(Some(&cell(json!({ "v": 0.25 })))), "0.25");
        assert_eq!(cell_value(Some(&cell(json!({ "v": true })))), "true");
    }
}
