//! Action processors
//!
//! A processor owns its options and the [`ActionEnv`]. `validate` checks the
//! options, `execute` builds the argument vector, runs the tool exactly once
//! and, for read actions, binds the parsed output into the shared context.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use kubeact_core::SharedContext;

use crate::args::push_multiple_with_value;
use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use crate::handlers::ActionKind;
use crate::manifest::ManifestResolver;

mod delete;
mod docker_secret;
mod get_all;
mod get_one;
mod manifest;
mod wait;

pub use delete::DeleteProcessor;
pub use docker_secret::ApplyDockerSecretProcessor;
pub use get_all::GetAllProcessor;
pub use get_one::GetOneProcessor;
pub use manifest::ManifestProcessor;
pub use wait::WaitProcessor;

#[async_trait]
pub trait ActionProcessor: Send + Sync {
    fn kind(&self) -> ActionKind;

    /// Check the options without touching the filesystem or the cluster
    fn validate(&self) -> Result<()>;

    /// Run the action
    async fn execute(&self, context: &mut SharedContext) -> Result<()>;
}

/// `-R -f <dir>` with every glob in `paths` resolved into one fresh directory
pub(crate) async fn push_paths(
    args: &mut Vec<String>,
    env: &ActionEnv,
    manifests: &ManifestResolver<'_>,
    paths: Option<&[String]>,
) -> Result<()> {
    let Some(paths) = paths.filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let dir = env.temp().create_temp_dir()?;
    args.push("-R".to_string());
    args.push("-f".to_string());
    args.push(dir.display().to_string());

    for path in paths {
        manifests.process_glob_path(path, &dir).await?;
    }
    Ok(())
}

/// `-f <file>` per inline object
pub(crate) async fn push_inline(
    args: &mut Vec<String>,
    manifests: &ManifestResolver<'_>,
    inline: Option<&[JsonValue]>,
) -> Result<()> {
    push_multiple_with_value(args, "-f", inline, |object| {
        let object = object.clone();
        async move {
            let path = manifests.write_yaml_to_temp_file(&object).await?;
            Ok::<_, ActionError>(path.display().to_string())
        }
    })
    .await
}

/// Resources returned by `get -o json`
///
/// A `List` is unwrapped into its items; any other object is a single item.
pub(crate) fn parse_items(stdout: &str) -> Result<Vec<JsonValue>> {
    let response: JsonValue = serde_json::from_str(stdout).map_err(ActionError::Parse)?;

    if response.get("kind").and_then(JsonValue::as_str) != Some("List") {
        return Ok(vec![response]);
    }

    Ok(match response.get("items") {
        Some(JsonValue::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}

/// Non-empty values joined with `separator`, as one argument
pub(crate) fn joined(values: Option<&[String]>, separator: &str) -> Option<String> {
    values
        .filter(|values| !values.is_empty())
        .map(|values| values.join(separator))
}

pub(crate) fn validation(kind: ActionKind, result: kubeact_core::ValidationResult) -> Result<()> {
    result.map_err(|info| ActionError::validation(kind.name(), info))
}
