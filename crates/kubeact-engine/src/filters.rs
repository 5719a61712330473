//! Filters available to manifest templates
//!
//! A small set aimed at building Kubernetes objects from context values.

use base64::Engine as _;
use minijinja::{Error, ErrorKind, Value};
use sha2::{Digest, Sha256};

fn invalid(message: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.to_string())
}

fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(invalid)
}

/// Render a value as YAML without the document marker
///
/// Usage: `{{ ctx.labels | toyaml }}`
pub fn toyaml(value: Value) -> Result<String, Error> {
    let yaml = serde_yaml::to_string(&to_json(&value)?).map_err(invalid)?;
    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// Render a value as compact JSON
///
/// Usage: `{{ ctx.config | tojson }}`
pub fn tojson(value: Value) -> Result<String, Error> {
    serde_json::to_string(&to_json(&value)?).map_err(invalid)
}

/// Usage: `{{ secrets.password | b64encode }}`
#[must_use]
pub fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value)
}

/// Usage: `{{ encoded | b64decode }}`
pub fn b64decode(value: String) -> Result<String, Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|e| invalid(format!("base64 decode error: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| invalid(format!("UTF-8 decode error: {}", e)))
}

/// Wrap in double quotes, escaping backslashes and quotes
///
/// Usage: `{{ ctx.version | quote }}`
#[must_use]
pub fn quote(value: Value) -> String {
    let raw = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Prefix a newline, then indent every non-empty line
///
/// Usage: `{{ ctx.labels | toyaml | nindent(4) }}`
#[must_use]
pub fn nindent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    let lines: Vec<String> = value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect();
    format!("\n{}", lines.join("\n"))
}

/// Fail rendering when the value is missing or an empty string
///
/// Usage: `{{ parameters.image | required("image is required") }}`
pub fn required(value: Value, message: Option<String>) -> Result<Value, Error> {
    let missing = value.is_undefined()
        || value.is_none()
        || value.as_str().is_some_and(str::is_empty);

    if missing {
        Err(invalid(
            message.unwrap_or_else(|| "required value is missing".to_string()),
        ))
    } else {
        Ok(value)
    }
}

/// Hex-encoded SHA256 digest
///
/// Usage: `{{ ctx.config | tojson | sha256 }}`
#[must_use]
pub fn sha256sum(value: String) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
