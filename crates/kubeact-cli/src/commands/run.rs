//! Run command - validate and execute one action against the cluster

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use kubeact_engine::JinjaResolver;
use kubeact_kube::{ActionEnv, ActionKind, TempPathsRegistry, TokioCommandRunner, run_action};
use serde_json::json;

use super::{load_context, load_options};
use crate::error::{CliError, Result};

/// Run the action named by `action`
#[allow(clippy::too_many_arguments)]
pub async fn run(
    action: &str,
    options_file: Option<&Path>,
    context_files: &[PathBuf],
    params: &[String],
    wd: Option<&Path>,
    kubectl: &str,
    print_context: bool,
    lenient: bool,
) -> Result<()> {
    let kind = ActionKind::from_id(action)?;
    let options = load_options(options_file)?;
    let mut context = load_context(context_files, params)?;

    let wd = match wd {
        Some(wd) => wd.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let resolver = JinjaResolver::builder()
        .strict(!lenient)
        .build()
        .map_err(|e| CliError::internal(e.to_string()))?;
    let temp = Arc::new(TempPathsRegistry::new()?);

    let env = ActionEnv::new(
        Arc::new(TokioCommandRunner),
        temp.clone(),
        Arc::new(resolver),
        wd.clone(),
    )
    .with_tool(kubectl);

    eprintln!(
        "{} Running {} in {}",
        style("→").blue().bold(),
        style(kind.id()).cyan(),
        wd.display()
    );

    let result = run_action(action, options, env, &mut context).await;

    if let Err(e) = temp.cleanup() {
        tracing::warn!(error = %e, "Failed to remove temporary manifests");
    }
    result?;

    eprintln!("{} {} completed", style("✓").green().bold(), kind.name());

    if print_context {
        // secrets stay out of stdout
        let shown = json!({
            "ctx": context.ctx,
            "parameters": context.parameters,
        });
        let output = serde_json::to_string_pretty(&shown)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", output);
    }

    Ok(())
}
