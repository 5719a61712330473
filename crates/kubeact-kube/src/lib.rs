//! Kubeact Kube - kubectl-backed actions
//!
//! This crate provides:
//! - **Actions**: apply, create, delete, get (all / one), wait and docker
//!   registry secrets, each validated then run as a single `kubectl` call
//! - **Manifest Resolution**: inline objects, files and globs, templated and
//!   written to temp files
//! - **Result Binding**: read actions write what they fetch into the shared
//!   context
//! - **Process Runner**: tokio-based runner and an in-memory mock for tests

pub mod args;
pub mod binder;
pub mod env;
pub mod error;
pub mod handlers;
pub mod manifest;
pub mod options;
pub mod processors;
pub mod runner;
pub mod temp;

pub use binder::bind_result;
pub use env::{ActionEnv, DEFAULT_TOOL};
pub use error::{ActionError, Result};
pub use handlers::{ActionKind, create_processor, processor_for, run_action};
pub use manifest::{ManifestResolver, ManifestSource};
pub use options::{
    ActionOptions, DeleteOptions, DockerCredentials, DockerSecretOptions, GetAllOptions,
    GetOneOptions, ManifestOptions, WaitFor, WaitOptions,
};
pub use processors::{
    ActionProcessor, ApplyDockerSecretProcessor, DeleteProcessor, GetAllProcessor,
    GetOneProcessor, ManifestProcessor, WaitProcessor,
};
pub use runner::{CommandRunner, ExecOutput, Invocation, MockCommandRunner, TokioCommandRunner};
pub use temp::TempPathsRegistry;
