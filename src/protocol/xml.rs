//! XML `componentData` payloads.
//!
//! ```xml
//! <templateData>
//!   <componentData id="Title"><data id="text" value="Hello"/></componentData>
//! </templateData>
//! ```

use roxmltree::{Document, Node};

use crate::foundation::error::{CuegenError, CuegenResult};
use crate::protocol::payload::FlatPayload;

const SYNTHETIC_ROOT: &str = "cuegen-fragment";

/// Extract id → value pairs from every `componentData` element.
///
/// Value preference: the element's own `value` attribute, then the text of a `<value>` descendant,
/// then the `value` attribute of a `<data>` child.
pub(crate) fn component_pairs(text: &str) -> CuegenResult<FlatPayload> {
    let wrapped;
    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(first) => {
            // Fragments with several top-level elements need a single root.
            wrapped = format!(
                "<{SYNTHETIC_ROOT}>{}</{SYNTHETIC_ROOT}>",
                strip_declaration(text)
            );
            Document::parse(&wrapped)
                .map_err(|_| CuegenError::parse(format!("malformed XML payload: {first}")))?
        }
    };

    let mut flat = FlatPayload::new();
    for node in doc
        .descendants()
        .filter(|n| is_element_named(n, "componentData"))
    {
        let Some(id) = attribute_ci(&node, "id") else {
            tracing::debug!("componentData element without id");
            continue;
        };
        match component_value(&node) {
            Some(value) => flat.insert(id, value),
            None => tracing::debug!(id, "componentData element without a value"),
        }
    }
    Ok(flat)
}

fn component_value(node: &Node<'_, '_>) -> Option<String> {
    if let Some(v) = attribute_ci(node, "value") {
        return Some(v.to_string());
    }
    if let Some(v) = node.descendants().find(|n| is_element_named(n, "value")) {
        return Some(
            v.descendants()
                .filter(Node::is_text)
                .filter_map(|t| t.text())
                .collect(),
        );
    }
    node.children()
        .filter(|n| is_element_named(n, "data"))
        .find_map(|d| attribute_ci(&d, "value"))
        .map(str::to_string)
}

fn is_element_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

fn attribute_ci<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}

fn strip_declaration(text: &str) -> &str {
    let trimmed = text.trim_start();
    if trimmed.starts_with("<?xml")
        && let Some(end) = trimmed.find("?>")
    {
        return &trimmed[end + 2..];
    }
    trimmed
}
