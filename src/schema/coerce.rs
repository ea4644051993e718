use serde_json::Value;

use crate::foundation::core::{Argb, PropertyType, PropertyValue, format_number};

/// Truthiness of a raw runtime value.
///
/// Strings count as true unless empty, `"false"` or `"0"`.
pub(crate) fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Color from a pre-packed ARGB integer or a `#RRGGBB` / `#AARRGGBB` string.
pub(crate) fn color_from_raw(raw: &Value) -> Option<Argb> {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_i64().map(|v| v as u32))
            .map(Argb),
        Value::String(s) => Argb::parse_hex(s),
        _ => None,
    }
}

/// Typed default for a property read through its accessor.
pub(crate) fn coerce_default(ty: PropertyType, raw: &Value) -> Option<PropertyValue> {
    match ty {
        PropertyType::String => Some(PropertyValue::String(match raw {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
            other => other.to_string(),
        })),
        PropertyType::Number => {
            let n = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            };
            n.filter(|v| v.is_finite()).map(PropertyValue::Number)
        }
        PropertyType::Boolean => Some(PropertyValue::Boolean(truthy(raw))),
        PropertyType::Color => color_from_raw(raw).map(PropertyValue::Color),
        PropertyType::Trigger | PropertyType::Image => None,
    }
}
