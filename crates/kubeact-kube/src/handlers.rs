//! Action registry
//!
//! Every action has a canonical id and three aliases:
//!
//! | id                                               | aliases                                                       |
//! |--------------------------------------------------|---------------------------------------------------------------|
//! | `com.fireblink.fbl.plugins.k8s.kubectl.apply`    | `fbl.plugins.k8s.kubectl.apply`, `k8s.kubectl.apply`, `kubectl.apply` |
//!
//! and likewise for `create`, `delete`, `get.all`, `get.one`, `wait` and
//! `apply.docker.secret`.

use serde_json::Value as JsonValue;

use kubeact_core::SharedContext;

use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use crate::options::ActionOptions;
use crate::processors::{
    ActionProcessor, ApplyDockerSecretProcessor, DeleteProcessor, GetAllProcessor,
    GetOneProcessor, ManifestProcessor, WaitProcessor,
};

/// Id prefixes, canonical first
const ID_PREFIXES: &[&str] = &[
    "com.fireblink.fbl.plugins.k8s.kubectl.",
    "fbl.plugins.k8s.kubectl.",
    "k8s.kubectl.",
    "kubectl.",
];

/// Minimum similarity for "did you mean" hints
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Apply,
    Create,
    Delete,
    GetAll,
    GetOne,
    Wait,
    ApplyDockerSecret,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Apply,
        ActionKind::Create,
        ActionKind::Delete,
        ActionKind::GetAll,
        ActionKind::GetOne,
        ActionKind::Wait,
        ActionKind::ApplyDockerSecret,
    ];

    /// Short name, the last part of every id
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Apply => "apply",
            ActionKind::Create => "create",
            ActionKind::Delete => "delete",
            ActionKind::GetAll => "get.all",
            ActionKind::GetOne => "get.one",
            ActionKind::Wait => "wait",
            ActionKind::ApplyDockerSecret => "apply.docker.secret",
        }
    }

    /// Canonical id
    pub fn id(&self) -> String {
        format!("{}{}", ID_PREFIXES[0], self.name())
    }

    pub fn aliases(&self) -> Vec<String> {
        ID_PREFIXES[1..]
            .iter()
            .map(|prefix| format!("{}{}", prefix, self.name()))
            .collect()
    }

    /// One-line description for listings
    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::Apply => "Apply manifests from files, globs or inline objects",
            ActionKind::Create => "Create resources from files, globs or inline objects",
            ActionKind::Delete => "Delete resources by type, name, label or manifest",
            ActionKind::GetAll => "Fetch matching resources into the context",
            ActionKind::GetOne => "Fetch a single resource into the context",
            ActionKind::Wait => "Wait for a condition or deletion",
            ActionKind::ApplyDockerSecret => "Apply a docker registry secret",
        }
    }

    /// Whether `id` is the canonical id or an alias of this action
    pub fn matches(&self, id: &str) -> bool {
        ID_PREFIXES
            .iter()
            .any(|prefix| id.strip_prefix(prefix) == Some(self.name()))
    }

    /// Find the action for an id or alias
    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.matches(id))
            .ok_or_else(|| ActionError::UnknownAction {
                id: id.to_string(),
                suggestion: suggest(id),
            })
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

fn suggest(id: &str) -> Option<String> {
    ActionKind::ALL
        .iter()
        .flat_map(|kind| std::iter::once(kind.id()).chain(kind.aliases()))
        .map(|candidate| (strsim::jaro_winkler(id, &candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Build the processor for already parsed options
pub fn create_processor(options: ActionOptions, env: ActionEnv) -> Box<dyn ActionProcessor> {
    match options {
        ActionOptions::Apply(o) => Box::new(ManifestProcessor::apply(o, env)),
        ActionOptions::Create(o) => Box::new(ManifestProcessor::create(o, env)),
        ActionOptions::Delete(o) => Box::new(DeleteProcessor::new(o, env)),
        ActionOptions::GetAll(o) => Box::new(GetAllProcessor::new(o, env)),
        ActionOptions::GetOne(o) => Box::new(GetOneProcessor::new(o, env)),
        ActionOptions::Wait(o) => Box::new(WaitProcessor::new(o, env)),
        ActionOptions::ApplyDockerSecret(o) => Box::new(ApplyDockerSecretProcessor::new(o, env)),
    }
}

/// Look up `id`, parse `options` and build the processor
pub fn processor_for(
    id: &str,
    options: JsonValue,
    env: ActionEnv,
) -> Result<Box<dyn ActionProcessor>> {
    let kind = ActionKind::from_id(id)?;
    let options = ActionOptions::from_value(kind, options)?;
    Ok(create_processor(options, env))
}

/// Validate, then execute, the action named by `id`
pub async fn run_action(
    id: &str,
    options: JsonValue,
    env: ActionEnv,
    context: &mut SharedContext,
) -> Result<()> {
    let processor = processor_for(id, options, env)?;
    processor.validate()?;
    processor.execute(context).await
}
