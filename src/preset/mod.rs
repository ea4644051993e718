//! XML preset export.
//!
//! A preset lists one `componentData` entry per non-trigger property holding its stringified
//! default, either bare (`<templateData>`) or wrapped in a playout-client `<items><item>`
//! descriptor.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::PropertyType;
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::schema::model::Schema;

/// Preset document shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetShape {
    /// Bare `<templateData>` listing.
    #[default]
    TemplateData,
    /// `<items><item>` descriptor with host metadata.
    Items,
}

/// Host metadata for [`PresetShape::Items`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PresetOptions {
    /// Output shape.
    pub shape: PresetShape,
    /// Target device name.
    pub device_name: String,
    /// Item label; defaults to the artboard name.
    pub label: Option<String>,
    /// Template name; defaults to the artboard name.
    pub name: Option<String>,
    /// Output channel.
    pub channel: u32,
    /// Layer index.
    pub video_layer: u32,
    /// Send data as JSON instead of structured XML.
    pub send_as_json: bool,
}

impl Default for PresetOptions {
    fn default() -> Self {
        Self {
            shape: PresetShape::default(),
            device_name: String::new(),
            label: None,
            name: None,
            channel: 1,
            video_layer: 20,
            send_as_json: false,
        }
    }
}

impl PresetOptions {
    /// Parse preset options JSON from a file.
    pub fn from_path(path: impl AsRef<Path>) -> CuegenResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CuegenError::validation(format!("open preset options '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| CuegenError::validation(format!("parse preset options: {e}")))
    }
}

/// Render the preset XML for `schema`.
pub fn export_preset(schema: &Schema, options: &PresetOptions) -> String {
    let components = component_list(schema, "  ");
    match options.shape {
        PresetShape::TemplateData => format!("<templateData>\n{components}</templateData>\n"),
        PresetShape::Items => {
            let label = options.label.as_deref().unwrap_or(schema.artboard());
            let name = options.name.as_deref().unwrap_or(schema.artboard());
            let nested = component_list(schema, "      ");
            let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<items>\n  <item>\n");
            push_field(&mut out, "type", "HTML");
            push_field(&mut out, "devicename", &options.device_name);
            push_field(&mut out, "label", label);
            push_field(&mut out, "name", name);
            push_field(&mut out, "channel", &options.channel.to_string());
            push_field(&mut out, "videolayer", &options.video_layer.to_string());
            push_field(&mut out, "usestoreddata", "false");
            push_field(&mut out, "useuppercasedata", "false");
            push_field(&mut out, "sendasjson", if options.send_as_json { "true" } else { "false" });
            out.push_str("    <templatedata>\n");
            out.push_str(&nested);
            out.push_str("    </templatedata>\n  </item>\n</items>\n");
            out
        }
    }
}

fn component_list(schema: &Schema, indent: &str) -> String {
    let mut out = String::new();
    for p in schema
        .properties()
        .iter()
        .filter(|p| p.ty != PropertyType::Trigger)
    {
        let value = p
            .default_value
            .as_ref()
            .map(|v| v.display_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{indent}<componentData id=\"{}\"><data id=\"text\" value=\"{}\"/></componentData>\n",
            xml_escape(&p.name),
            xml_escape(&value)
        ));
    }
    out
}

fn push_field(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("    <{tag}>{}</{tag}>\n", xml_escape(value)));
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}
