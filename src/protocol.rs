//! Tag-line decoding for captured runtime output.
//!
//! The driver's tag line is the second-to-last line of its stream: the
//! trailing newline it prints produces one final empty element when the
//! output is split on line breaks.

use serde_json::Value;

use crate::error::{Error, Result};

const STATUS_OK: &str = "ok";

/// Decode captured stdout from a zero-exit run into the evaluation outcome.
pub(crate) fn decode(raw: &[u8]) -> Result<Value> {
    let text = String::from_utf8_lossy(raw).replace('\r', "");
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return Err(Error::Protocol {
            line: text.clone(),
            reason: "output ended before a result line was printed".to_owned(),
        });
    }
    let tag = lines[lines.len() - 2];

    let mut parts: Vec<Value> = serde_json::from_str(tag).map_err(|e| Error::Protocol {
        line: tag.to_owned(),
        reason: e.to_string(),
    })?;

    // Missing elements default: no status reads as an error, no value as null.
    if parts.is_empty() {
        parts.push(Value::String("err".to_owned()));
    }
    if parts.len() == 1 {
        parts.push(Value::Null);
    }

    let mut it = parts.into_iter();
    let status = it.next().unwrap_or(Value::Null);
    let value = it.next().unwrap_or(Value::Null);

    if status.as_str() == Some(STATUS_OK) {
        return Ok(value);
    }
    Err(Error::Eval(stringify(&value)))
}

/// String form of a tag value: string payloads as-is, anything else as JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
