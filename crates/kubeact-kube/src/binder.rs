//! Binding read results into the shared context

use serde_json::Value as JsonValue;

use kubeact_core::{Destination, SharedContext};

use crate::error::Result;

/// Assign and/or push `value`; absent destinations are skipped
pub fn bind_result(
    context: &mut SharedContext,
    assign_to: Option<&Destination>,
    push_to: Option<&Destination>,
    value: &JsonValue,
) -> Result<()> {
    if let Some(destination) = assign_to {
        tracing::debug!(%destination, "assigning result");
        context.assign_to(destination, value)?;
    }

    if let Some(destination) = push_to {
        tracing::debug!(%destination, "pushing result");
        context.push_to(destination, value)?;
    }

    Ok(())
}
