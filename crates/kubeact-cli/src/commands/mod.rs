//! CLI commands

pub mod actions;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};

use kubeact_core::{SharedContext, deep_merge, parse_set_values};
use serde_json::Value as JsonValue;

use crate::error::{CliError, Result};

/// Read action options from a YAML or JSON file; no file means no options
pub fn load_options(path: Option<&Path>) -> Result<JsonValue> {
    match path {
        Some(path) => read_yaml(path),
        None => Ok(JsonValue::Null),
    }
}

/// Build the shared context from context files and `--param` assignments
///
/// Context files hold any of the `ctx`, `secrets` and `parameters` sections
/// and are merged in order. Parameters given on the command line win.
pub fn load_context(files: &[PathBuf], params: &[String]) -> Result<SharedContext> {
    let mut merged = serde_json::json!({});
    for file in files {
        let value = read_yaml(file)?;
        if value.is_null() {
            continue;
        }
        if !value.is_object() {
            return Err(CliError::usage(format!(
                "Context file {} must contain a mapping",
                file.display()
            )));
        }
        deep_merge(&mut merged, &value);
    }

    let mut context: SharedContext = serde_json::from_value(merged)
        .map_err(|e| CliError::usage(format!("Invalid context: {}", e)))?;

    if !params.is_empty() {
        let mut parameters = context.parameters.clone();
        deep_merge(&mut parameters, &parse_set_values(params)?);
        context = context.with_parameters(parameters);
    }

    Ok(context)
}

fn read_yaml(path: &Path) -> Result<JsonValue> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
    serde_yaml::from_str::<Option<JsonValue>>(&content)
        .map(Option::unwrap_or_default)
        .map_err(|e| CliError::file(path, e))
}
