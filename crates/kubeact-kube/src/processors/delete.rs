//! `delete`

use async_trait::async_trait;

use kubeact_core::SharedContext;

use super::{ActionProcessor, joined, push_inline, push_paths, validation};
use crate::args::{push_extra, push_labels, push_with_value, push_without_value};
use crate::env::ActionEnv;
use crate::error::Result;
use crate::handlers::ActionKind;
use crate::options::DeleteOptions;

pub struct DeleteProcessor {
    options: DeleteOptions,
    env: ActionEnv,
}

impl DeleteProcessor {
    pub fn new(options: DeleteOptions, env: ActionEnv) -> Self {
        Self { options, env }
    }

    pub async fn prepare_args(&self, context: &SharedContext) -> Result<Vec<String>> {
        let manifests = self.env.manifests(context);
        let options = &self.options;
        let mut args = vec!["delete".to_string()];

        push_with_value(&mut args, "-n", options.namespace.as_deref());
        push_labels(&mut args, options.labels.as_ref());
        push_extra(&mut args, options.extra.as_deref());
        args.extend(joined(options.resources.as_deref(), ","));
        // kubectl reads this as a single name; kept for compatibility
        args.extend(joined(options.names.as_deref(), " "));
        push_paths(&mut args, &self.env, &manifests, options.paths.as_deref()).await?;
        push_inline(&mut args, &manifests, options.inline.as_deref()).await?;
        push_without_value(&mut args, "--all", options.all.unwrap_or(false));

        Ok(args)
    }
}

#[async_trait]
impl ActionProcessor for DeleteProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::Delete
    }

    fn validate(&self) -> Result<()> {
        validation(ActionKind::Delete, self.options.validate())
    }

    async fn execute(&self, context: &mut SharedContext) -> Result<()> {
        let args = self.prepare_args(context).await?;
        self.env.exec(&args, self.options.debug, "\n").await?;
        Ok(())
    }
}
