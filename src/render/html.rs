use std::sync::Mutex;

use super::traits::{RenderError, RenderTarget, RowTemplate};
use crate::response::Row;

pub fn wrap_tag(content: &str, tag: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}

/// Default template: one table row, `th` cells for the header row and `td`
/// cells for everything else. Cell text is inserted verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRowTemplate;

impl RowTemplate for HtmlRowTemplate {
    fn render(&self, row: &Row) -> Result<String, RenderError> {
        let tag = if row.is_header() { "th" } else { "td" };
        let cells: String = row.cells.values().map(|value| wrap_tag(value, tag)).collect();
        Ok(wrap_tag(&cells, "tr"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// A `<table>`; output is grouped into `<thead>` and `<tbody>`
    Table,
    /// Any other container; output is appended as is
    Block,
}

/// In-memory markup document that render output is appended to
#[derive(Debug)]
pub struct MarkupDocument {
    element: Element,
    content: Mutex<String>,
}

impl MarkupDocument {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            content: Mutex::new(String::new()),
        }
    }

    pub fn table() -> Self {
        Self::new(Element::Table)
    }

    pub fn block() -> Self {
        Self::new(Element::Block)
    }

    pub fn element(&self) -> Element {
        self.element
    }

    /// Inner markup accumulated so far
    pub fn content(&self) -> String {
        self.content.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The full element, including its own tags
    pub fn to_markup(&self) -> String {
        let tag = match self.element {
            Element::Table => "table",
            Element::Block => "div",
        };
        wrap_tag(&self.content(), tag)
    }
}

impl RenderTarget for MarkupDocument {
    fn is_tabular(&self) -> bool {
        self.element == Element::Table
    }

    fn append(&self, header: &str, body: &str) {
        let mut content = self.content.lock().unwrap_or_else(|e| e.into_inner());
        match self.element {
            Element::Table => {
                content.push_str(&wrap_tag(header, "thead"));
                content.push_str(&wrap_tag(body, "tbody"));
            }
            Element::Block => {
                content.push_str(header);
                content.push_str(body);
            }
        }
    }
}
