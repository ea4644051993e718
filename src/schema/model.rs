use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::core::{PropertyType, PropertyValue};
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::schema::coerce::coerce_default;

/// A named, typed, data-bound property of the animation's view model.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    /// Property name (case-sensitive identity).
    pub name: String,
    /// Declared type.
    pub ty: PropertyType,
    /// Typed default; `None` for triggers, images and unreadable values.
    pub default_value: Option<PropertyValue>,
}

impl PropertyDescriptor {
    /// Build a descriptor.
    pub fn new(
        name: impl Into<String>,
        ty: PropertyType,
        default_value: Option<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value,
        }
    }
}

/// Normalized data-binding schema for one (source, artboard, state machine) selection.
///
/// Schemas are immutable; re-selection builds a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRecord", into = "SchemaRecord")]
pub struct Schema {
    artboard: String,
    state_machine: String,
    properties: Vec<PropertyDescriptor>,
}

impl Schema {
    /// Build a schema, rejecting empty or duplicate property names.
    pub fn new(
        artboard: impl Into<String>,
        state_machine: impl Into<String>,
        properties: Vec<PropertyDescriptor>,
    ) -> CuegenResult<Self> {
        let mut seen = BTreeSet::new();
        for p in &properties {
            if p.name.is_empty() {
                return Err(CuegenError::validation("property name must not be empty"));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(CuegenError::validation(format!(
                    "duplicate property name \"{}\"",
                    p.name
                )));
            }
        }
        Ok(Self {
            artboard: artboard.into(),
            state_machine: state_machine.into(),
            properties,
        })
    }

    /// Parse the schema JSON format from a string.
    pub fn from_json_str(s: &str) -> CuegenResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CuegenError::validation(format!("parse schema JSON: {e}")))
    }

    /// Parse the schema JSON format from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CuegenResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CuegenError::validation(format!("parse schema JSON: {e}")))
    }

    /// Parse the schema JSON format from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CuegenResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CuegenError::validation(format!("open schema JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed schema JSON.
    pub fn to_json_pretty(&self) -> CuegenResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Selected artboard name.
    pub fn artboard(&self) -> &str {
        &self.artboard
    }

    /// Selected state machine name (empty when the artboard has none).
    pub fn state_machine(&self) -> &str {
        &self.state_machine
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Exact-name lookup.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRecord {
    artboard: String,
    #[serde(default)]
    state_machine: String,
    #[serde(default)]
    view_model_props: Vec<PropRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PropRecord {
    name: String,
    #[serde(rename = "type")]
    ty: PropertyType,
    #[serde(default)]
    value: Value,
}

impl TryFrom<SchemaRecord> for Schema {
    type Error = CuegenError;

    fn try_from(rec: SchemaRecord) -> CuegenResult<Self> {
        let props = rec
            .view_model_props
            .into_iter()
            .map(|p| {
                let default_value = coerce_default(p.ty, &p.value);
                PropertyDescriptor::new(p.name, p.ty, default_value)
            })
            .collect();
        Schema::new(rec.artboard, rec.state_machine, props)
    }
}

impl From<Schema> for SchemaRecord {
    fn from(s: Schema) -> Self {
        Self {
            artboard: s.artboard,
            state_machine: s.state_machine,
            view_model_props: s
                .properties
                .into_iter()
                .map(|p| PropRecord {
                    name: p.name,
                    ty: p.ty,
                    value: p
                        .default_value
                        .as_ref()
                        .map_or(Value::Null, PropertyValue::to_json),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/model.rs"]
mod tests;
