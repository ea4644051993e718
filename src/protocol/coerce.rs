use serde_json::Value;

use crate::foundation::core::{Argb, format_number};

/// String form of a payload value.
pub(crate) fn to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Finite number, or `None` when the value does not parse as one.
pub(crate) fn to_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// `true` for `true`, `1`, `"true"`, `"1"` and `"yes"` (case-insensitive); `false` otherwise.
pub(crate) fn to_boolean(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        _ => false,
    }
}

/// `#RRGGBB` / `#AARRGGBB`, else a decimal or `0x` hex number.
pub(crate) fn to_color(v: &Value) -> Option<Argb> {
    match v {
        Value::Number(n) => n.as_f64().and_then(Argb::from_number),
        Value::String(s) => {
            let s = s.trim();
            if s.starts_with('#') {
                return Argb::parse_hex(s);
            }
            if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                return u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(|n| Argb::from_number(f64::from(n)));
            }
            s.parse::<f64>().ok().and_then(Argb::from_number)
        }
        _ => None,
    }
}

/// Whether a trigger value asks for a fire.
pub(crate) fn should_fire(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}
