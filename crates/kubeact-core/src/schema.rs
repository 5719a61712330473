//! Option schema rules
//!
//! Options are plain serde structs; the rules here cover what serde cannot
//! express: field combinators (`with`, `without`, `xor`, `or`), non-empty
//! constraints and the minimal shape of an inline Kubernetes object.

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrorInfo {
    /// Offending field (dotted path, `value` for the whole object)
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationErrorInfo {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" {}", self.path, self.message)
    }
}

pub type ValidationResult = std::result::Result<(), ValidationErrorInfo>;

/// Set of option fields that were supplied
#[derive(Debug, Clone, Default)]
pub struct Presence {
    fields: BTreeSet<&'static str>,
}

impl Presence {
    /// Build from `(field, present)` pairs
    pub fn from_fields(fields: impl IntoIterator<Item = (&'static str, bool)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .filter_map(|(name, present)| present.then_some(name))
                .collect(),
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    fn count(&self, fields: &[&str]) -> usize {
        fields.iter().filter(|f| self.has(f)).count()
    }
}

/// Field combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// When the field is present, every peer must be present
    With(&'static str, &'static [&'static str]),
    /// When the field is present, no peer may be present
    Without(&'static str, &'static [&'static str]),
    /// Exactly one of the fields must be present
    Xor(&'static [&'static str]),
    /// At least one of the fields must be present
    Or(&'static [&'static str]),
}

impl Rule {
    pub fn check(&self, presence: &Presence) -> ValidationResult {
        match *self {
            Rule::With(field, peers) => {
                if presence.has(field) {
                    if let Some(missing) = peers.iter().find(|p| !presence.has(p)) {
                        return Err(ValidationErrorInfo::new(
                            field,
                            format!("missing required peer \"{}\"", missing),
                        ));
                    }
                }
                Ok(())
            }
            Rule::Without(field, peers) => {
                if presence.has(field) {
                    if let Some(conflict) = peers.iter().find(|p| presence.has(p)) {
                        return Err(ValidationErrorInfo::new(
                            field,
                            format!("conflict with forbidden peer \"{}\"", conflict),
                        ));
                    }
                }
                Ok(())
            }
            Rule::Xor(fields) => match presence.count(fields) {
                1 => Ok(()),
                0 => Err(ValidationErrorInfo::new(
                    "value",
                    format!("must contain at least one of [{}]", fields.join(", ")),
                )),
                _ => Err(ValidationErrorInfo::new(
                    "value",
                    format!(
                        "contains a conflict between exclusive peers [{}]",
                        fields.join(", ")
                    ),
                )),
            },
            Rule::Or(fields) => {
                if presence.count(fields) == 0 {
                    Err(ValidationErrorInfo::new(
                        "value",
                        format!("must contain at least one of [{}]", fields.join(", ")),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Check every rule in order, stopping at the first failure
pub fn check_rules(presence: &Presence, rules: &[Rule]) -> ValidationResult {
    rules.iter().try_for_each(|rule| rule.check(presence))
}

/// Optional string, when present, must not be empty
pub fn non_empty_str(field: &str, value: Option<&str>) -> ValidationResult {
    match value {
        Some("") => Err(ValidationErrorInfo::new(
            field,
            "is not allowed to be empty",
        )),
        _ => Ok(()),
    }
}

/// Every element of an optional list must be a non-empty string
pub fn non_empty_items(field: &str, values: Option<&[String]>) -> ValidationResult {
    if let Some(values) = values {
        for (index, value) in values.iter().enumerate() {
            non_empty_str(&format!("{}.{}", field, index), Some(value.as_str()))?;
        }
    }
    Ok(())
}

/// Optional list, when present, must hold at least one element
pub fn non_empty_list<T>(field: &str, values: Option<&[T]>) -> ValidationResult {
    match values {
        Some([]) => Err(ValidationErrorInfo::new(
            field,
            "must contain at least 1 items",
        )),
        _ => Ok(()),
    }
}

/// Label maps need non-empty keys and values
pub fn labels<'a>(
    field: &str,
    labels: Option<impl IntoIterator<Item = (&'a String, &'a String)>>,
) -> ValidationResult {
    if let Some(labels) = labels {
        for (key, value) in labels {
            if key.is_empty() {
                return Err(ValidationErrorInfo::new(
                    field,
                    "label names are not allowed to be empty",
                ));
            }
            non_empty_str(&format!("{}.{}", field, key), Some(value.as_str()))?;
        }
    }
    Ok(())
}

/// Minimal shape of a Kubernetes object
///
/// `kind`, `apiVersion` and `metadata.name` must be strings,
/// `metadata.namespace` must be a string when given; anything else is
/// passed through untouched.
pub fn k8s_object(field: &str, value: &JsonValue) -> ValidationResult {
    let Some(object) = value.as_object() else {
        return Err(ValidationErrorInfo::new(field, "must be of type object"));
    };

    for key in ["kind", "apiVersion"] {
        require_string(field, key, object.get(key))?;
    }

    let metadata_path = format!("{}.metadata", field);
    let Some(metadata) = object.get("metadata") else {
        return Err(ValidationErrorInfo::new(metadata_path, "is required"));
    };
    let Some(metadata) = metadata.as_object() else {
        return Err(ValidationErrorInfo::new(metadata_path, "must be of type object"));
    };

    require_string(&metadata_path, "name", metadata.get("name"))?;

    match metadata.get("namespace") {
        None | Some(JsonValue::String(_)) => Ok(()),
        Some(_) => Err(ValidationErrorInfo::new(
            format!("{}.namespace", metadata_path),
            "must be a string",
        )),
    }
}

fn require_string(parent: &str, key: &str, value: Option<&JsonValue>) -> ValidationResult {
    match value {
        Some(JsonValue::String(_)) => Ok(()),
        Some(_) => Err(ValidationErrorInfo::new(
            format!("{}.{}", parent, key),
            "must be a string",
        )),
        None => Err(ValidationErrorInfo::new(
            format!("{}.{}", parent, key),
            "is required",
        )),
    }
}
