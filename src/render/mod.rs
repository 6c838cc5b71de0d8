//! Render/dispatch of parsed rows
//!
//! Each row goes through a [`RowTemplate`] (default [`HtmlRowTemplate`]).
//! Output for the header row (ordinal 0) and for data rows is collected
//! separately, appended to the [`RenderTarget`] if there is one, and
//! returned as a single markup string either way.

mod html;
mod traits;

pub use html::{Element, HtmlRowTemplate, MarkupDocument, wrap_tag};
pub use traits::{RenderError, RenderTarget, RowTemplate};

use crate::options::ResolvedOptions;
use crate::response::Row;

/// Header and body markup of one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub header: String,
    pub body: String,
    /// Combined markup handed to the caller
    pub markup: String,
}

/// Render `rows` with the caller's template and append them to the target.
pub fn render_rows(options: &ResolvedOptions, rows: &[Row]) -> Result<Rendered, RenderError> {
    let default_template = HtmlRowTemplate;
    let template: &dyn RowTemplate = match &options.user.row_template {
        Some(template) => template.as_ref(),
        None => &default_template,
    };

    let mut header = String::new();
    let mut body = String::new();

    for row in rows {
        let markup = template.render(row)?;
        if row.is_header() {
            header.push_str(&markup);
        } else {
            body.push_str(&markup);
        }
    }

    let markup = match &options.user.target {
        Some(target) => {
            target.append(&header, &body);
            if target.is_tabular() {
                format!("{}{}", wrap_tag(&header, "thead"), wrap_tag(&body, "tbody"))
            } else {
                format!("{header}{body}")
            }
        }
        None => format!("{header}{body}"),
    };

    Ok(Rendered {
        header,
        body,
        markup,
    })
}
