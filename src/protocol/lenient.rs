//! Recovery for JSON that hosts mangle on the way in: wrapped in an extra pair of quotes, with
//! raw line breaks inside string values, or simply broken.

use regex::Regex;
use serde_json::Value;

use crate::foundation::error::{CuegenError, CuegenResult};
use crate::protocol::payload::FlatPayload;

const PAIR_PATTERN: &str = r#""([^"]+)"\s*:\s*"([^"]*)""#;

/// Unwrap one layer of surrounding quotes, escape raw control characters inside string values,
/// and retry a strict parse.
pub(crate) fn recover_json(text: &str) -> Option<Value> {
    let unwrapped = unwrap_quotes(text);
    let escaped = escape_raw_newlines(unwrapped);
    serde_json::from_str(&escaped).ok()
}

/// Best-effort `"key": "value"` scrape. Tolerates whitespace and newlines around separators and
/// backslash-escaped quotes from double-encoded payloads.
pub(crate) fn scrape_pairs(text: &str) -> CuegenResult<FlatPayload> {
    let re = Regex::new(PAIR_PATTERN)
        .map_err(|e| CuegenError::parse(format!("failed to build pair scraper: {e}")))?;
    let text = text.replace("\\\"", "\"");
    Ok(re
        .captures_iter(&text)
        .map(|cap| (cap[1].to_string(), unescape(&cap[2])))
        .collect())
}

fn unwrap_quotes(text: &str) -> &str {
    let t = text.trim();
    for q in ['"', '\''] {
        if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
            return t[1..t.len() - 1].trim();
        }
    }
    t
}

fn escape_raw_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
