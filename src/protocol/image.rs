use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use serde_json::Value;

use crate::foundation::error::{CuegenError, CuegenResult};
use crate::runtime::{DecodedImage, ImageRequest};

/// Turn an image payload value into a request for an image slot.
///
/// Accepts `data:<mime>;base64,...`, `b64:...`, `http(s)://...` and raw base64. Empty strings,
/// `"clear"` and `"none"` clear the binding.
pub(crate) fn image_request(v: &Value) -> CuegenResult<ImageRequest> {
    let s = match v {
        Value::Null => return Ok(ImageRequest::Clear),
        Value::String(s) => s.trim(),
        _ => return Err(CuegenError::parse("image source must be a string")),
    };

    if s.is_empty() || s.eq_ignore_ascii_case("clear") || s.eq_ignore_ascii_case("none") {
        return Ok(ImageRequest::Clear);
    }

    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(ImageRequest::Remote(s.to_string()));
    }

    let encoded = if let Some(rest) = s.strip_prefix("data:") {
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| CuegenError::parse("data URL without payload"))?;
        if !header.to_ascii_lowercase().ends_with(";base64") {
            return Err(CuegenError::parse("only base64 data URLs are supported"));
        }
        data
    } else if let Some(rest) = s.strip_prefix("b64:") {
        rest
    } else {
        s
    };

    let bytes = decode_base64(encoded)?;
    Ok(ImageRequest::Decoded(decode_image(&bytes)?))
}

fn decode_base64(encoded: &str) -> CuegenResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .context("decode base64 image source")?;
    Ok(bytes)
}

/// Decode PNG/JPEG/... bytes into straight-alpha RGBA8.
pub(crate) fn decode_image(bytes: &[u8]) -> CuegenResult<DecodedImage> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}
