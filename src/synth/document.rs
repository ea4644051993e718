use minijinja::{Environment, context};

use crate::foundation::error::{CuegenError, CuegenResult};

const DOCUMENT_TEMPLATE: &str = include_str!("templates/document.html");
const PROTOCOL_JS: &str = include_str!("templates/protocol.js");

/// Everything the document template interpolates.
pub(crate) struct DocumentParts<'a> {
    pub(crate) title: &'a str,
    pub(crate) profile: &'a str,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) canvas_id: &'a str,
    pub(crate) runtime_src: &'a str,
    pub(crate) schema_island_id: &'a str,
    pub(crate) schema_json: &'a str,
    pub(crate) tables: &'a str,
    pub(crate) surface: &'a str,
}

/// Render the HTML shell. Plain values are HTML-escaped; script fragments are inserted verbatim.
pub(crate) fn render(parts: &DocumentParts<'_>) -> CuegenResult<String> {
    let mut env = Environment::new();
    env.add_template("document.html", DOCUMENT_TEMPLATE)
        .map_err(|e| CuegenError::render(format!("load document template: {e}")))?;
    let tmpl = env
        .get_template("document.html")
        .map_err(|e| CuegenError::render(format!("document template: {e}")))?;

    let mut html = tmpl
        .render(context! {
            version => env!("CARGO_PKG_VERSION"),
            title => parts.title,
            profile => parts.profile,
            width => parts.width,
            height => parts.height,
            canvas_id => parts.canvas_id,
            runtime_src => parts.runtime_src,
            schema_island_id => parts.schema_island_id,
            schema_json => parts.schema_json,
            tables => parts.tables,
            protocol => PROTOCOL_JS,
            surface => parts.surface,
        })
        .map_err(|e| CuegenError::render(format!("render document: {e}")))?;
    html.push('\n');
    Ok(html)
}
