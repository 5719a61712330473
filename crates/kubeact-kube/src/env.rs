//! Runtime collaborators handed to every action

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kubeact_core::SharedContext;
use kubeact_engine::TemplateResolver;

use crate::error::{ActionError, Result};
use crate::manifest::ManifestResolver;
use crate::runner::CommandRunner;
use crate::temp::TempPathsRegistry;

/// Default program invoked by every action
pub const DEFAULT_TOOL: &str = "kubectl";

/// Process runner, temp registry, template resolver and working directory
#[derive(Clone)]
pub struct ActionEnv {
    runner: Arc<dyn CommandRunner>,
    temp: Arc<TempPathsRegistry>,
    resolver: Arc<dyn TemplateResolver>,
    wd: PathBuf,
    tool: String,
}

impl std::fmt::Debug for ActionEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEnv")
            .field("wd", &self.wd)
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl ActionEnv {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        temp: Arc<TempPathsRegistry>,
        resolver: Arc<dyn TemplateResolver>,
        wd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            temp,
            resolver,
            wd: wd.into(),
            tool: DEFAULT_TOOL.to_string(),
        }
    }

    /// Use another program instead of `kubectl`
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn wd(&self) -> &Path {
        &self.wd
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn temp(&self) -> &TempPathsRegistry {
        &self.temp
    }

    /// Manifest resolver bound to the given context
    pub fn manifests<'a>(&'a self, context: &'a SharedContext) -> ManifestResolver<'a> {
        ManifestResolver::new(&self.wd, &self.temp, self.resolver.as_ref(), context)
    }

    /// Run the tool once with `args`
    ///
    /// With `debug` the command line is logged before running, and the
    /// exit code and streams afterwards. A failing run always logs them.
    /// Chunks are joined with `separator` in the returned stdout.
    pub async fn exec(&self, args: &[String], debug: bool, separator: &str) -> Result<String> {
        let command = format!("{} {}", self.tool, args.join(" "));
        if debug {
            tracing::info!(%command, "running command");
        } else {
            tracing::debug!(%command, "running command");
        }

        let output = self.runner.run(&self.tool, args, &self.wd).await?;
        let stdout = output.stdout_joined(separator);
        let stderr = output.stderr_joined("\n");

        if !output.is_success() {
            tracing::warn!(code = output.code, %stdout, %stderr, "command exited with non-zero code");
            return Err(ActionError::CommandFailed {
                command,
                code: output.code,
                stdout,
                stderr,
            });
        }

        if debug {
            tracing::info!(code = output.code, %stdout, %stderr, "command finished");
        }

        Ok(stdout)
    }
}
