//! `apply` and `create`

use async_trait::async_trait;

use kubeact_core::SharedContext;

use super::{ActionProcessor, push_inline, push_paths, validation};
use crate::args::{push_extra, push_labels, push_with_value};
use crate::env::ActionEnv;
use crate::error::Result;
use crate::handlers::ActionKind;
use crate::options::ManifestOptions;

/// Sends manifests to `kubectl apply` or `kubectl create`
pub struct ManifestProcessor {
    kind: ActionKind,
    options: ManifestOptions,
    env: ActionEnv,
}

impl ManifestProcessor {
    pub fn apply(options: ManifestOptions, env: ActionEnv) -> Self {
        Self {
            kind: ActionKind::Apply,
            options,
            env,
        }
    }

    pub fn create(options: ManifestOptions, env: ActionEnv) -> Self {
        Self {
            kind: ActionKind::Create,
            options,
            env,
        }
    }

    fn verb(&self) -> &'static str {
        match self.kind {
            ActionKind::Create => "create",
            _ => "apply",
        }
    }

    pub async fn prepare_args(&self, context: &SharedContext) -> Result<Vec<String>> {
        let manifests = self.env.manifests(context);
        let mut args = vec![self.verb().to_string()];

        push_with_value(&mut args, "-n", self.options.namespace.as_deref());
        push_paths(&mut args, &self.env, &manifests, self.options.paths.as_deref()).await?;
        push_inline(&mut args, &manifests, self.options.inline.as_deref()).await?;
        push_labels(&mut args, self.options.labels.as_ref());
        push_extra(&mut args, self.options.extra.as_deref());

        Ok(args)
    }
}

#[async_trait]
impl ActionProcessor for ManifestProcessor {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn validate(&self) -> Result<()> {
        validation(self.kind, self.options.validate())
    }

    async fn execute(&self, context: &mut SharedContext) -> Result<()> {
        let args = self.prepare_args(context).await?;
        self.env.exec(&args, self.options.debug, "\n").await?;
        Ok(())
    }
}
