//! Result destinations inside the shared context
//!
//! Two spellings are accepted:
//!
//! ```yaml
//! # a single section-qualified path
//! assignResourceTo: $.ctx.configMap
//!
//! # one path per section, relative to it
//! pushResourcesTo:
//!   ctx: $.configMaps
//!   secrets: $.configMaps
//!   children: true
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::context::{Section, SharedContext};
use crate::error::{CoreError, Result};
use crate::values::{push_nested, set_nested, split_path};

/// Where to write an action result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    /// `$.ctx.path`, `$.secrets.path` or `$.parameters.path`
    Path(String),
    /// Per-section paths
    Targets(DestinationTargets),
}

/// Per-section destination paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,

    /// Push the elements of a sequence instead of the sequence itself
    #[serde(default)]
    pub children: bool,
}

/// A destination resolved to concrete locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub section: Section,
    pub path: String,
}

impl Destination {
    /// Shorthand for a section-qualified path destination
    pub fn path(path: impl Into<String>) -> Self {
        Destination::Path(path.into())
    }

    /// Whether sequence values are spread on push
    pub fn spreads_children(&self) -> bool {
        matches!(self, Destination::Targets(t) if t.children)
    }

    /// Resolve into the list of locations to write to
    pub fn targets(&self) -> Result<Vec<ResolvedTarget>> {
        match self {
            Destination::Path(raw) => {
                let rest = strip_root(raw)?;
                let (section, path) = match rest.split_once('.') {
                    Some((section, path)) => (section, path),
                    None => (rest, ""),
                };
                let section = section.parse::<Section>().map_err(|_| invalid(
                    raw,
                    "expected $.ctx, $.secrets or $.parameters prefix",
                ))?;
                Ok(vec![ResolvedTarget {
                    section,
                    path: path.to_string(),
                }])
            }
            Destination::Targets(targets) => {
                let mut resolved = Vec::with_capacity(3);
                for (section, raw) in [
                    (Section::Ctx, &targets.ctx),
                    (Section::Secrets, &targets.secrets),
                    (Section::Parameters, &targets.parameters),
                ] {
                    if let Some(raw) = raw {
                        resolved.push(ResolvedTarget {
                            section,
                            path: strip_root(raw)?.to_string(),
                        });
                    }
                }

                if resolved.is_empty() {
                    return Err(invalid(
                        &self.to_string(),
                        "at least one of ctx, secrets or parameters is required",
                    ));
                }
                Ok(resolved)
            }
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Path(path) => f.write_str(path),
            Destination::Targets(targets) => {
                let parts: Vec<String> = [
                    ("ctx", &targets.ctx),
                    ("secrets", &targets.secrets),
                    ("parameters", &targets.parameters),
                ]
                .into_iter()
                .filter_map(|(name, path)| path.as_ref().map(|p| format!("{}: {}", name, p)))
                .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// `$` or `$.rest` → `rest`
fn strip_root(raw: &str) -> Result<&str> {
    if raw == "$" {
        return Ok("");
    }
    raw.strip_prefix("$.")
        .filter(|rest| !rest.is_empty() && !rest.split('.').any(str::is_empty))
        .ok_or_else(|| invalid(raw, "paths must look like $.some.path"))
}

fn invalid(destination: &str, message: &str) -> CoreError {
    CoreError::InvalidDestination {
        destination: destination.to_string(),
        message: message.to_string(),
    }
}

impl SharedContext {
    /// Replace the value at every location named by `destination`
    pub fn assign_to(&mut self, destination: &Destination, value: &JsonValue) -> Result<()> {
        for target in destination.targets()? {
            let section = self.section_mut(target.section);
            set_nested(section, &split_path(&target.path), value.clone());
        }
        Ok(())
    }

    /// Append the value to the sequence at every location named by `destination`
    pub fn push_to(&mut self, destination: &Destination, value: &JsonValue) -> Result<()> {
        let spread = destination.spreads_children();
        for target in destination.targets()? {
            let section = self.section_mut(target.section);
            push_nested(section, &split_path(&target.path), value.clone(), spread).map_err(
                |_| CoreError::NotAnArray {
                    path: format!("$.{}.{}", target.section, target.path),
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_destination_targets() {
        let targets = Destination::path("$.ctx.a.b").targets().unwrap();
        assert_eq!(
            targets,
            vec![ResolvedTarget {
                section: Section::Ctx,
                path: "a.b".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_path_destinations() {
        for raw in ["ctx.a", "$.", "$.other.a", "$.ctx..a"] {
            assert!(
                Destination::path(raw).targets().is_err(),
                "expected '{}' to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_assign_replaces() {
        let mut ctx = SharedContext::new();
        ctx.ctx = json!({"cm": {"old": true}});

        ctx.assign_to(&Destination::path("$.ctx.cm"), &json!({"new": true}))
            .unwrap();

        assert_eq!(ctx.ctx, json!({"cm": {"new": true}}));
    }

    #[test]
    fn test_push_appends() {
        let mut ctx = SharedContext::new();
        let dest = Destination::path("$.ctx.list");

        ctx.push_to(&dest, &json!(1)).unwrap();
        ctx.push_to(&dest, &json!(2)).unwrap();

        assert_eq!(ctx.ctx["list"], json!([1, 2]));
    }

    #[test]
    fn test_targets_write_every_section() {
        let dest: Destination = serde_yaml::from_str(
            "ctx: $.items\nsecrets: $.items\nchildren: true\n",
        )
        .unwrap();
        let mut ctx = SharedContext::new();

        ctx.push_to(&dest, &json!(["a", "b"])).unwrap();

        assert_eq!(ctx.ctx["items"], json!(["a", "b"]));
        assert_eq!(ctx.secrets["items"], json!(["a", "b"]));
        assert_eq!(ctx.parameters, json!({}));
    }

    #[test]
    fn test_empty_targets_rejected() {
        let dest: Destination = serde_yaml::from_str("children: true\n").unwrap();
        assert!(dest.targets().is_err());
    }

    #[test]
    fn test_push_to_scalar_fails_with_full_path() {
        let mut ctx = SharedContext::new();
        ctx.ctx = json!({"name": "x"});

        let err = ctx
            .push_to(&Destination::path("$.ctx.name"), &json!(1))
            .unwrap_err();

        assert!(err.to_string().contains("$.ctx.name"));
    }
}
