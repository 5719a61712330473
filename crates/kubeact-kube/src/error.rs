//! Error types for kubeact-kube

use kubeact_core::ValidationErrorInfo;
use thiserror::Error;

/// Result type for kubeact-kube operations
pub type Result<T> = std::result::Result<T, ActionError>;

/// Errors that can occur while running an action
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Options rejected by the action schema
    #[error("invalid options for {action}: {info}")]
    Validation {
        action: String,
        info: ValidationErrorInfo,
    },

    /// Manifest file has no content
    #[error("File is empty. {path}")]
    EmptyFile { path: String },

    /// Glob pattern matched no manifest files
    #[error("Unable to find any json or yaml files matching: {pattern}")]
    NoMatch { pattern: String },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The tool exited with a non-zero code
    #[error("\"{command}\" command failed.{}", output_streams(.stdout, .stderr))]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// The tool could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A single-resource lookup returned nothing
    #[error("Unable to find any resources")]
    NotFound,

    /// Tool output was not valid JSON
    #[error("unable to parse command output: {0}")]
    Parse(#[source] serde_json::Error),

    /// No handler for the requested operation id
    #[error("unknown action '{id}'{}", suggestion.as_ref().map(|s| format!(". Did you mean '{}'?", s)).unwrap_or_default())]
    UnknownAction {
        id: String,
        suggestion: Option<String>,
    },

    /// Template resolution failed
    #[error("template error: {0}")]
    Template(#[from] kubeact_engine::EngineError),

    /// Shared context access failed (bad destination, reference, ...)
    #[error("context error: {0}")]
    Context(#[from] kubeact_core::CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ActionError {
    fn from(e: serde_json::Error) -> Self {
        ActionError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for ActionError {
    fn from(e: serde_yaml::Error) -> Self {
        ActionError::Serialization(e.to_string())
    }
}

/// Non-empty streams, one labelled block each
fn output_streams(stdout: &str, stderr: &str) -> String {
    [("stdout", stdout), ("stderr", stderr)]
        .into_iter()
        .filter(|(_, stream)| !stream.trim().is_empty())
        .map(|(label, stream)| format!("\n{}: {}", label, stream.trim_end()))
        .collect()
}

impl ActionError {
    pub(crate) fn validation(action: &str, info: ValidationErrorInfo) -> Self {
        ActionError::Validation {
            action: action.to_string(),
            info,
        }
    }
}
