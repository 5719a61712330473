//! Action options
//!
//! One struct per action. Deserialization rejects unknown fields and wrong
//! types; `validate` then checks what serde cannot: non-empty values, the
//! shape of inline objects and the field combinators of each action.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use kubeact_core::schema::{
    Presence, Rule, ValidationErrorInfo, ValidationResult, check_rules, k8s_object, labels,
    non_empty_items, non_empty_list, non_empty_str,
};
use kubeact_core::Destination;

use crate::error::{ActionError, Result};
use crate::handlers::ActionKind;

pub type Labels = IndexMap<String, String>;

/// Options of `apply` and `create`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestOptions {
    /// Manifest files or glob patterns, relative to the working directory
    pub paths: Option<Vec<String>>,
    /// Kubernetes objects given directly
    pub inline: Option<Vec<JsonValue>>,
    pub labels: Option<Labels>,
    #[serde(default)]
    pub debug: bool,
    pub namespace: Option<String>,
    /// Appended to the command line verbatim
    pub extra: Option<Vec<String>>,
}

impl ManifestOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_list("paths", self.paths.as_deref())?;
        non_empty_items("paths", self.paths.as_deref())?;
        non_empty_list("inline", self.inline.as_deref())?;
        inline_objects("inline", self.inline.as_deref())?;
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;

        check_rules(
            &Presence::from_fields([
                ("paths", self.paths.is_some()),
                ("inline", self.inline.is_some()),
            ]),
            &[Rule::Or(&["paths", "inline"])],
        )
    }
}

/// Options of `delete`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteOptions {
    pub resources: Option<Vec<String>>,
    pub names: Option<Vec<String>>,
    pub paths: Option<Vec<String>>,
    pub inline: Option<Vec<JsonValue>>,
    pub labels: Option<Labels>,
    /// Delete every resource of the given types
    pub all: Option<bool>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub debug: bool,
    pub extra: Option<Vec<String>>,
}

impl DeleteOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_list("resources", self.resources.as_deref())?;
        non_empty_items("resources", self.resources.as_deref())?;
        non_empty_items("names", self.names.as_deref())?;
        non_empty_items("paths", self.paths.as_deref())?;
        inline_objects("inline", self.inline.as_deref())?;
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;

        check_rules(
            &Presence::from_fields([
                ("resources", self.resources.is_some()),
                ("names", self.names.is_some()),
                ("paths", self.paths.is_some()),
                ("inline", self.inline.is_some()),
                ("labels", self.labels.is_some()),
                ("all", self.all.is_some()),
            ]),
            &[
                Rule::With("names", &["resources"]),
                Rule::Without("paths", &["resources"]),
                Rule::Without("labels", &["names"]),
                Rule::Or(&["names", "paths", "inline", "labels", "all"]),
            ],
        )
    }
}

/// Options of `get.all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetAllOptions {
    pub resources: Option<Vec<String>>,
    pub names: Option<Vec<String>>,
    pub paths: Option<Vec<String>>,
    pub inline: Option<Vec<JsonValue>>,
    pub labels: Option<Labels>,
    #[serde(default)]
    pub debug: bool,
    pub namespace: Option<String>,
    pub extra: Option<Vec<String>>,
    /// Replace the destination with the list of found resources
    pub assign_resources_to: Option<Destination>,
    /// Append the list of found resources to the destination
    pub push_resources_to: Option<Destination>,
}

impl GetAllOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_list("resources", self.resources.as_deref())?;
        non_empty_items("resources", self.resources.as_deref())?;
        non_empty_items("names", self.names.as_deref())?;
        non_empty_items("paths", self.paths.as_deref())?;
        inline_objects("inline", self.inline.as_deref())?;
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;
        destination("assignResourcesTo", self.assign_resources_to.as_ref())?;
        destination("pushResourcesTo", self.push_resources_to.as_ref())?;

        check_rules(
            &Presence::from_fields([
                ("resources", self.resources.is_some()),
                ("names", self.names.is_some()),
                ("paths", self.paths.is_some()),
                ("inline", self.inline.is_some()),
                ("labels", self.labels.is_some()),
            ]),
            &[
                Rule::With("names", &["resources"]),
                Rule::Without("paths", &["resources"]),
                Rule::Without("labels", &["names"]),
                Rule::Or(&["resources", "names", "paths", "inline", "labels"]),
            ],
        )
    }
}

/// Options of `get.one`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetOneOptions {
    pub resource: Option<String>,
    pub name: Option<String>,
    /// Single manifest file identifying the resource
    pub path: Option<String>,
    /// Single object identifying the resource
    pub inline: Option<JsonValue>,
    pub labels: Option<Labels>,
    #[serde(default)]
    pub debug: bool,
    pub namespace: Option<String>,
    pub extra: Option<Vec<String>>,
    pub assign_resource_to: Option<Destination>,
    pub push_resource_to: Option<Destination>,
}

impl GetOneOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_str("resource", self.resource.as_deref())?;
        non_empty_str("name", self.name.as_deref())?;
        non_empty_str("path", self.path.as_deref())?;
        if let Some(inline) = &self.inline {
            k8s_object("inline", inline)?;
        }
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;
        destination("assignResourceTo", self.assign_resource_to.as_ref())?;
        destination("pushResourceTo", self.push_resource_to.as_ref())?;

        check_rules(
            &Presence::from_fields([
                ("resource", self.resource.is_some()),
                ("name", self.name.is_some()),
                ("path", self.path.is_some()),
                ("inline", self.inline.is_some()),
                ("labels", self.labels.is_some()),
            ]),
            &[
                Rule::With("name", &["resource"]),
                Rule::Without("path", &["resource"]),
                Rule::Without("labels", &["name"]),
                Rule::Or(&["resource", "name", "path", "inline", "labels"]),
            ],
        )
    }
}

/// What `wait` waits for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitFor {
    pub delete: Option<bool>,
    pub condition: Option<String>,
}

/// Options of `wait`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WaitOptions {
    pub resource: String,
    pub name: Option<String>,
    pub labels: Option<Labels>,
    pub all: Option<bool>,
    #[serde(rename = "for")]
    pub wait_for: WaitFor,
    #[serde(default)]
    pub debug: bool,
    pub namespace: Option<String>,
    /// Passed to `--timeout` as-is, e.g. `60s`
    pub timeout: Option<String>,
    pub extra: Option<Vec<String>>,
}

impl WaitOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_str("resource", Some(self.resource.as_str()))?;
        non_empty_str("name", self.name.as_deref())?;
        non_empty_str("timeout", self.timeout.as_deref())?;
        non_empty_str("for.condition", self.wait_for.condition.as_deref())?;
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;

        Rule::Xor(&["delete", "condition"])
            .check(&Presence::from_fields([
                ("delete", self.wait_for.delete.is_some()),
                ("condition", self.wait_for.condition.is_some()),
            ]))
            .map_err(|info| ValidationErrorInfo::new("for", info.message))?;

        check_rules(
            &Presence::from_fields([
                ("name", self.name.is_some()),
                ("labels", self.labels.is_some()),
                ("all", self.all.is_some()),
            ]),
            &[Rule::Xor(&["name", "labels", "all"])],
        )
    }
}

/// Registry credentials of a docker secret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerCredentials {
    pub username: String,
    pub password: String,
    pub email: String,
    pub server: String,
}

/// Options of `apply.docker.secret`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DockerSecretOptions {
    /// Secret name
    pub name: String,
    /// Existing docker config file, relative to the working directory
    pub path: Option<String>,
    pub inline: Option<DockerCredentials>,
    pub labels: Option<Labels>,
    #[serde(default)]
    pub debug: bool,
    pub namespace: Option<String>,
    pub extra: Option<Vec<String>>,
}

impl DockerSecretOptions {
    pub fn validate(&self) -> ValidationResult {
        non_empty_str("name", Some(self.name.as_str()))?;
        non_empty_str("path", self.path.as_deref())?;
        if let Some(inline) = &self.inline {
            for (field, value) in [
                ("username", &inline.username),
                ("password", &inline.password),
                ("email", &inline.email),
                ("server", &inline.server),
            ] {
                non_empty_str(&format!("inline.{}", field), Some(value.as_str()))?;
            }
        }
        common(self.labels.as_ref(), self.namespace.as_deref(), self.extra.as_deref())?;

        check_rules(
            &Presence::from_fields([
                ("path", self.path.is_some()),
                ("inline", self.inline.is_some()),
            ]),
            &[Rule::Xor(&["path", "inline"])],
        )
    }
}

/// Options of any action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOptions {
    Apply(ManifestOptions),
    Create(ManifestOptions),
    Delete(DeleteOptions),
    GetAll(GetAllOptions),
    GetOne(GetOneOptions),
    Wait(WaitOptions),
    ApplyDockerSecret(DockerSecretOptions),
}

impl ActionOptions {
    /// Deserialize raw options for the given action
    ///
    /// Type errors and unknown fields are reported as validation errors.
    pub fn from_value(kind: ActionKind, value: JsonValue) -> Result<Self> {
        let value = match value {
            JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
            other => other,
        };

        Ok(match kind {
            ActionKind::Apply => ActionOptions::Apply(parse(kind, value)?),
            ActionKind::Create => ActionOptions::Create(parse(kind, value)?),
            ActionKind::Delete => ActionOptions::Delete(parse(kind, value)?),
            ActionKind::GetAll => ActionOptions::GetAll(parse(kind, value)?),
            ActionKind::GetOne => ActionOptions::GetOne(parse(kind, value)?),
            ActionKind::Wait => ActionOptions::Wait(parse(kind, value)?),
            ActionKind::ApplyDockerSecret => ActionOptions::ApplyDockerSecret(parse(kind, value)?),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionOptions::Apply(_) => ActionKind::Apply,
            ActionOptions::Create(_) => ActionKind::Create,
            ActionOptions::Delete(_) => ActionKind::Delete,
            ActionOptions::GetAll(_) => ActionKind::GetAll,
            ActionOptions::GetOne(_) => ActionKind::GetOne,
            ActionOptions::Wait(_) => ActionKind::Wait,
            ActionOptions::ApplyDockerSecret(_) => ActionKind::ApplyDockerSecret,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            ActionOptions::Apply(o) | ActionOptions::Create(o) => o.validate(),
            ActionOptions::Delete(o) => o.validate(),
            ActionOptions::GetAll(o) => o.validate(),
            ActionOptions::GetOne(o) => o.validate(),
            ActionOptions::Wait(o) => o.validate(),
            ActionOptions::ApplyDockerSecret(o) => o.validate(),
        }
    }
}

fn parse<T: DeserializeOwned>(kind: ActionKind, value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        ActionError::validation(kind.name(), ValidationErrorInfo::new("value", e.to_string()))
    })
}

fn common(
    label_map: Option<&Labels>,
    namespace: Option<&str>,
    extra: Option<&[String]>,
) -> ValidationResult {
    labels("labels", label_map)?;
    non_empty_str("namespace", namespace)?;
    non_empty_items("extra", extra)
}

fn inline_objects(field: &str, objects: Option<&[JsonValue]>) -> ValidationResult {
    for (index, object) in objects.unwrap_or_default().iter().enumerate() {
        k8s_object(&format!("{}.{}", field, index), object)?;
    }
    Ok(())
}

fn destination(field: &str, destination: Option<&Destination>) -> ValidationResult {
    if let Some(destination) = destination {
        destination
            .targets()
            .map_err(|e| ValidationErrorInfo::new(field, e.to_string()))?;
    }
    Ok(())
}
