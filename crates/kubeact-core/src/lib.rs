//! kubeact Core - shared types for kubectl-backed workflow actions
//!
//! This crate provides the foundational types used throughout kubeact:
//! - `SharedContext`: Host-owned workflow state (`ctx`, `secrets`, `parameters`)
//! - `Destination`: Where read actions write their results
//! - `schema`: Field combinators and shape checks for action options
//! - `values`: Dotted-path access and deep merge over JSON values

pub mod context;
pub mod destination;
pub mod error;
pub mod schema;
pub mod values;

pub use context::{Section, SharedContext};
pub use destination::{Destination, DestinationTargets, ResolvedTarget};
pub use error::{CoreError, Result};
pub use schema::{Presence, Rule, ValidationErrorInfo, ValidationResult};
pub use values::{deep_merge, parse_set_values};
