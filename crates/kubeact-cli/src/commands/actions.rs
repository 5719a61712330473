//! Actions command - list every action id and its aliases

use console::style;
use kubeact_kube::ActionKind;
use serde_json::json;

use crate::error::{CliError, Result};

pub fn run(json_output: bool) -> Result<()> {
    if json_output {
        let actions: Vec<_> = ActionKind::ALL
            .iter()
            .map(|kind| {
                json!({
                    "name": kind.name(),
                    "id": kind.id(),
                    "aliases": kind.aliases(),
                    "description": kind.description(),
                })
            })
            .collect();
        let output = serde_json::to_string_pretty(&actions)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    println!(
        "{:<22} {}",
        style("ACTION").bold(),
        style("DESCRIPTION").bold()
    );

    for kind in ActionKind::ALL {
        println!("{:<22} {}", kind.name(), kind.description());
        println!("  {}", style(kind.id()).dim());
        for alias in kind.aliases() {
            println!("  {}", style(alias).dim());
        }
    }

    Ok(())
}
