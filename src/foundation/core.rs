use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CuegenError, CuegenResult};

/// Declared type of a view-model property.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Text value.
    String,
    /// Finite floating-point value.
    Number,
    /// On/off value.
    Boolean,
    /// 32-bit ARGB color.
    Color,
    /// Fire-once signal with no persistent value.
    Trigger,
    /// Decoded image binding.
    Image,
}

impl PropertyType {
    /// Accessor order used when a payload key does not resolve to a declared property.
    pub const PROBE_ORDER: [PropertyType; 5] = [
        PropertyType::String,
        PropertyType::Number,
        PropertyType::Boolean,
        PropertyType::Color,
        PropertyType::Trigger,
    ];

    /// Lowercase wire name (`"string"`, `"number"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Trigger => "trigger",
            Self::Image => "image",
        }
    }

    /// Return `true` for types that carry a static default value.
    pub fn has_default(self) -> bool {
        !matches!(self, Self::Trigger | Self::Image)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CuegenError;

    fn from_str(s: &str) -> CuegenResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "color" => Ok(Self::Color),
            "trigger" => Ok(Self::Trigger),
            "image" => Ok(Self::Image),
            other => Err(CuegenError::validation(format!(
                "unknown property type \"{other}\""
            ))),
        }
    }
}

/// 32-bit color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Argb(pub u32);

impl Argb {
    const ALPHA_MASK: u32 = 0xFF00_0000;
    const RGB_MASK: u32 = 0x00FF_FFFF;

    /// Build an opaque color from the low 24 bits of `rgb`.
    pub fn opaque(rgb: u32) -> Self {
        Self((rgb & Self::RGB_MASK) | Self::ALPHA_MASK)
    }

    /// Parse `#RRGGBB` (alpha forced opaque) or `#AARRGGBB`.
    ///
    /// The leading `#` is required so that bare digit strings stay numeric.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(Self::opaque),
            8 => u32::from_str_radix(hex, 16).ok().map(Self),
            _ => None,
        }
    }

    /// Interpret a numeric color.
    ///
    /// Values that fit in 24 bits carry no alpha and are forced opaque; larger values are taken
    /// as full ARGB.
    pub fn from_number(n: f64) -> Option<Self> {
        if !n.is_finite() || n < 0.0 || n > f64::from(u32::MAX) {
            return None;
        }
        let v = n.trunc() as u32;
        if v <= Self::RGB_MASK {
            Some(Self::opaque(v))
        } else {
            Some(Self(v))
        }
    }

    /// Alpha channel.
    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// `#AARRGGBB` uppercase hex form.
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.0)
    }
}

/// Typed default value of a property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Text.
    String(String),
    /// Finite number.
    Number(f64),
    /// Flag.
    Boolean(bool),
    /// Packed ARGB color.
    Color(Argb),
}

impl PropertyValue {
    /// JSON representation used by the schema format (colors as unsigned integers).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Color(c) => serde_json::Value::from(c.0),
        }
    }

    /// String form used for baked defaults and preset files.
    pub fn display_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Color(c) => c.to_hex(),
        }
    }
}

/// Format a number the way a JavaScript `String(n)` would for common values:
/// integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
