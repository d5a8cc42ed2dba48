//! JSON payload utilities for extraction and parsing
//!
//! Generation providers are asked for machine-parseable output but routinely
//! wrap it in prose or markdown fences. These helpers locate the first
//! well-formed JSON value anywhere in a raw response.

use serde::de::DeserializeOwned;

use crate::error::{GenerationError, Result};

/// Extract the first balanced JSON object or array embedded in `text`.
///
/// Scans for the first `{` or `[` and walks forward tracking brace depth,
/// string state, and escapes. Returns the candidate slice, or None when no
/// opener exists or the value never closes.
pub fn extract_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find(|c| c == '{' || c == '[')?;
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and parse the first JSON payload into a typed structure.
///
/// Failure to locate or parse a payload is a ProviderParse error; callers
/// decide whether that is fatal (outline) or isolated (a single section).
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T> {
    let candidate = extract_json(text).ok_or_else(|| {
        let preview: String = text.chars().take(120).collect();
        GenerationError::ProviderParse(format!("no JSON payload found in response: {}", preview))
    })?;
    serde_json::from_str(candidate).map_err(|e| {
        GenerationError::ProviderParse(format!("payload did not match expected shape: {}", e))
    })
}
