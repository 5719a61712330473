//! `wait`

use async_trait::async_trait;

use kubeact_core::SharedContext;

use super::{ActionProcessor, validation};
use crate::args::{push_extra, push_labels, push_with_value, push_without_value};
use crate::env::ActionEnv;
use crate::error::Result;
use crate::handlers::ActionKind;
use crate::options::WaitOptions;

pub struct WaitProcessor {
    options: WaitOptions,
    env: ActionEnv,
}

impl WaitProcessor {
    pub fn new(options: WaitOptions, env: ActionEnv) -> Self {
        Self { options, env }
    }

    pub fn prepare_args(&self) -> Vec<String> {
        let options = &self.options;
        let mut args = vec!["wait".to_string()];

        push_with_value(&mut args, "--namespace", options.namespace.as_deref());
        push_with_value(&mut args, "--timeout", options.timeout.as_deref());
        push_without_value(&mut args, "--all", options.all.unwrap_or(false));
        push_extra(&mut args, options.extra.as_deref());

        // `delete: false` passes validation but adds no flag
        if options.wait_for.delete == Some(true) {
            args.push("--for=delete".to_string());
        }
        if let Some(condition) = &options.wait_for.condition {
            args.push(format!("--for=condition={}", condition));
        }

        push_labels(&mut args, options.labels.as_ref());
        args.push(options.resource.clone());
        args.extend(options.name.clone());

        args
    }
}

#[async_trait]
impl ActionProcessor for WaitProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::Wait
    }

    fn validate(&self) -> Result<()> {
        validation(ActionKind::Wait, self.options.validate())
    }

    async fn execute(&self, _context: &mut SharedContext) -> Result<()> {
        self.env
            .exec(&self.prepare_args(), self.options.debug, "\n")
            .await?;
        Ok(())
    }
}
