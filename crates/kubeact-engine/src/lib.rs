//! Kubeact Engine - template resolution for Kubernetes manifests
//!
//! This crate provides the pluggable [`TemplateResolver`] used while
//! resolving manifest files, with:
//! - A MiniJinja implementation with a global (`<$= $>`) and a local (`<%= %>`) pass
//! - Kubernetes-friendly filters (toyaml, b64encode, etc.)
//! - Diagnostics pointing at the offending template line

pub mod error;
pub mod filters;
pub mod resolver;

pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};
pub use resolver::{JinjaResolver, JinjaResolverBuilder, NoopResolver, TemplateResolver};
