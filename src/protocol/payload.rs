use serde_json::{Map, Value};

use crate::foundation::error::{CuegenError, CuegenResult};
use crate::protocol::coerce::to_text;
use crate::protocol::{lenient, xml};

const BOM: char = '\u{FEFF}';

/// Raw update payload as delivered by a host.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// JSON or XML text, possibly malformed.
    Text(String),
    /// Already-parsed value (a native mapping, or a JSON string holding a payload).
    Value(Value),
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// Flat name → value mapping produced by normalization.
///
/// Keys are the literal payload keys (not yet resolved against the schema), kept in the order the
/// host sent them. A later duplicate key overwrites the earlier value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatPayload(Map<String, Value>);

impl FlatPayload {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value for a literal key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FlatPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Normalize any supported payload encoding into a [`FlatPayload`].
///
/// Text starting with `<` is read as XML `componentData` elements. Anything else goes through
/// strict JSON, then lenient recovery, then a key/value scrape. Objects carrying a
/// `templateData` list are flattened.
pub fn normalize(payload: &Payload) -> CuegenResult<FlatPayload> {
    match payload {
        Payload::Text(s) => normalize_text(s, 0),
        Payload::Value(v) => normalize_value(v, 0),
    }
}

fn normalize_text(raw: &str, depth: u8) -> CuegenResult<FlatPayload> {
    let text = raw.strip_prefix(BOM).unwrap_or(raw).trim();
    if text.is_empty() {
        return Err(CuegenError::parse("empty payload"));
    }
    if text.starts_with('<') {
        return xml::component_pairs(text);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(v) => normalize_value(&v, depth),
        Err(strict) => {
            if let Some(v) = lenient::recover_json(text) {
                tracing::debug!(error = %strict, "payload recovered leniently");
                return normalize_value(&v, depth);
            }
            let scraped = lenient::scrape_pairs(text)?;
            if scraped.is_empty() {
                return Err(CuegenError::parse(format!(
                    "payload is neither JSON nor XML: {strict}"
                )));
            }
            tracing::debug!(pairs = scraped.len(), "payload scraped for key/value pairs");
            Ok(scraped)
        }
    }
}

fn normalize_value(v: &Value, depth: u8) -> CuegenResult<FlatPayload> {
    match v {
        // A JSON string holding the real payload; unwrap exactly once.
        Value::String(s) if depth == 0 => normalize_text(s, depth + 1),
        Value::Object(map) => Ok(match template_data(map) {
            Some(entries) => flatten_template_data(entries),
            None => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }),
        other => Err(CuegenError::parse(format!(
            "payload must be an object, got {}",
            json_kind(other)
        ))),
    }
}

fn template_data(map: &Map<String, Value>) -> Option<&Value> {
    map.get("templateData").or_else(|| map.get("templatedata"))
}

/// Flatten `[{id, value}]` / `[{id, data: {value|text}}]` into name → string.
fn flatten_template_data(entries: &Value) -> FlatPayload {
    let items: Vec<&Value> = match entries {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![entries],
        _ => Vec::new(),
    };

    let mut flat = FlatPayload::new();
    for item in items {
        let Some(id) = item.get("id").and_then(Value::as_str) else {
            continue;
        };
        let value = item
            .get("value")
            .filter(|v| !v.is_null())
            .or_else(|| {
                item.get("data")
                    .and_then(|d| d.get("value").or_else(|| d.get("text")))
            });
        match value {
            Some(v) => flat.insert(id, to_text(v)),
            None => tracing::debug!(id, "templateData entry without a value"),
        }
    }
    flat
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/payload.rs"]
mod tests;
