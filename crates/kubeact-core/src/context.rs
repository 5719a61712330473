//! Shared workflow state handed to actions
//!
//! The context is owned by the host. Actions read it while resolving
//! templates and `$ref:` references, and read operations write their
//! results back into it through [`Destination`](crate::Destination)s.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::values::{get_nested, split_path};

/// `$ref:<section>.<path>` or `$ref:<section>`
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$ref:(ctx|secrets|parameters)(?:\.(.+))?$").expect("reference regex is valid")
});

/// Top-level section of the shared context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Ctx,
    Secrets,
    Parameters,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Ctx => "ctx",
            Section::Secrets => "secrets",
            Section::Parameters => "parameters",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ctx" => Ok(Section::Ctx),
            "secrets" => Ok(Section::Secrets),
            "parameters" => Ok(Section::Parameters),
            other => Err(CoreError::UnknownSection {
                section: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-owned shared state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedContext {
    /// Workflow state visible to every step
    #[serde(default = "empty_object")]
    pub ctx: JsonValue,

    /// Sensitive state, never printed by the CLI
    #[serde(default = "empty_object")]
    pub secrets: JsonValue,

    /// Parameters of the current invocation
    #[serde(default = "empty_object")]
    pub parameters: JsonValue,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

impl Default for SharedContext {
    fn default() -> Self {
        Self {
            ctx: empty_object(),
            secrets: empty_object(),
            parameters: empty_object(),
        }
    }
}

impl SharedContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the parameters section
    pub fn with_parameters(mut self, parameters: JsonValue) -> Self {
        self.parameters = parameters;
        self
    }

    /// Borrow a section
    pub fn section(&self, section: Section) -> &JsonValue {
        match section {
            Section::Ctx => &self.ctx,
            Section::Secrets => &self.secrets,
            Section::Parameters => &self.parameters,
        }
    }

    /// Mutably borrow a section
    pub fn section_mut(&mut self, section: Section) -> &mut JsonValue {
        match section {
            Section::Ctx => &mut self.ctx,
            Section::Secrets => &mut self.secrets,
            Section::Parameters => &mut self.parameters,
        }
    }

    /// Look up a dotted path inside a section
    pub fn get(&self, section: Section, path: &str) -> Option<&JsonValue> {
        get_nested(self.section(section), &split_path(path))
    }

    /// Replace every `$ref:` string in `value` with the referenced context value
    ///
    /// References must match a whole string (`"$ref:ctx.db.host"`); strings
    /// that merely contain the marker are left alone.
    pub fn resolve_references(&self, value: JsonValue) -> Result<JsonValue> {
        match value {
            JsonValue::String(s) => match REFERENCE.captures(&s) {
                Some(caps) => {
                    // the regex only admits known section names
                    let section: Section = caps[1].parse()?;
                    let path = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                    self.get(section, path)
                        .cloned()
                        .ok_or_else(|| CoreError::UnresolvedReference {
                            reference: s.clone(),
                        })
                }
                None => Ok(JsonValue::String(s)),
            },
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_references(item))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            JsonValue::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    resolved.insert(key, self.resolve_references(item)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            other => Ok(other),
        }
    }
}
