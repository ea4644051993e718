//! Template synthesizer.
//!
//! Turns a [`Schema`] and [`SynthOptions`] into one self-contained HTML document: canvas, runtime
//! script tag, a JSON data island carrying the schema, static lookup tables, one setter per
//! property, the update protocol and the host command surface. Output is a pure function of the
//! inputs.

mod document;
mod options;
mod script;
mod tables;

pub use options::{
    CanvasSize, DEFAULT_EXTERNAL_PATH, DEFAULT_RUNTIME_BASE_URL, RUNTIME_MAJOR_VERSION,
    RenderBackend, SynthOptions,
};

use crate::foundation::error::{CuegenError, CuegenResult};
use crate::schema::model::Schema;
use document::DocumentParts;

/// A generated HTML document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDocument {
    text: String,
}

impl GeneratedDocument {
    /// Document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take the document text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Generate the playout document for `schema`.
#[tracing::instrument(
    skip(schema, options),
    fields(artboard = schema.artboard(), profile = %options.host_profile)
)]
pub fn synthesize(schema: &Schema, options: &SynthOptions) -> CuegenResult<GeneratedDocument> {
    let resolved = options.resolve(schema)?;
    let tables = script::tables_script(schema, options, &resolved)?;
    let schema_json = tables::js_literal_pretty(schema)?;

    let text = document::render(&DocumentParts {
        title: &resolved.title,
        profile: options.host_profile.as_str(),
        width: options.canvas.width,
        height: options.canvas.height,
        canvas_id: script::CANVAS_ID,
        runtime_src: &resolved.runtime_src,
        schema_island_id: script::SCHEMA_ISLAND_ID,
        schema_json: &schema_json,
        tables: &tables,
        surface: script::profile_script(options),
    })?;

    tracing::debug!(
        bytes = text.len(),
        properties = schema.properties().len(),
        "document synthesized"
    );
    Ok(GeneratedDocument { text })
}

/// Read back the schema a generated document carries in its data island.
pub fn read_baked_schema(document_text: &str) -> CuegenResult<Schema> {
    let open = format!(
        r#"<script type="application/json" id="{}">"#,
        script::SCHEMA_ISLAND_ID
    );
    let start = document_text
        .find(&open)
        .map(|i| i + open.len())
        .ok_or_else(|| CuegenError::validation("document carries no embedded schema"))?;
    let len = document_text[start..]
        .find("</script>")
        .ok_or_else(|| CuegenError::validation("unterminated schema data island"))?;
    Schema::from_json_str(document_text[start..start + len].trim())
}

#[cfg(test)]
#[path = "../../tests/unit/synth/synthesize.rs"]
mod tests;
