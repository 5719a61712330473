//! Validate command - check action options without calling kubectl

use std::path::Path;

use console::style;
use kubeact_kube::{ActionError, ActionKind, ActionOptions};

use super::load_options;
use crate::error::Result;

pub fn run(action: &str, options_file: Option<&Path>) -> Result<()> {
    let kind = ActionKind::from_id(action)?;
    let options = ActionOptions::from_value(kind, load_options(options_file)?)?;
    options.validate().map_err(|info| ActionError::Validation {
        action: kind.name().to_string(),
        info,
    })?;

    println!(
        "{} Options are valid for {}",
        style("✓").green().bold(),
        style(kind.id()).cyan()
    );
    Ok(())
}
