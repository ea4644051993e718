use serde::Serialize;

use crate::foundation::error::CuegenResult;

/// Make JSON text safe to place inside a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\u` escapes decode back to the same
/// characters. U+2028/U+2029 are valid JSON but end lines in older JS engines.
pub(crate) fn script_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Compact JSON literal, safe for inline script.
pub(crate) fn js_literal<T: Serialize + ?Sized>(value: &T) -> CuegenResult<String> {
    Ok(script_safe(&serde_json::to_string(value)?))
}

/// Pretty JSON literal, safe for inline script.
pub(crate) fn js_literal_pretty<T: Serialize + ?Sized>(value: &T) -> CuegenResult<String> {
    Ok(script_safe(&serde_json::to_string_pretty(value)?))
}
