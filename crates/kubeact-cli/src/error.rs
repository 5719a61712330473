//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use kubeact_kube::ActionError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Action options were rejected
    #[error("Validation failed: {message}")]
    #[diagnostic(code(kubeact::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Unknown action or malformed command line input
    #[error("{message}")]
    #[diagnostic(code(kubeact::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, empty manifest, no glob match, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubeact::cli::io))]
    Io { message: String },

    /// kubectl ran and exited with a non-zero code
    #[error("{message} (exit code {code})")]
    #[diagnostic(code(kubeact::cli::command))]
    CommandFailed {
        message: String,
        code: i32,
        #[help]
        help: Option<String>,
    },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(kubeact::cli::error))]
    Other { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(kubeact::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::CommandFailed { .. } => exit_codes::COMMAND_FAILED,
            CliError::Other { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a usage error (user provided invalid input)
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error for a file the CLI reads itself
    pub fn file(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), err),
        }
    }
}

impl From<ActionError> for CliError {
    fn from(err: ActionError) -> Self {
        let message = err.to_string();
        match err {
            ActionError::Validation { action, .. } => CliError::Validation {
                message,
                help: Some(format!(
                    "Run 'kubeact validate kubectl.{}' to check options without calling kubectl",
                    action
                )),
            },
            ActionError::UnknownAction { .. } => {
                CliError::usage_with_help(message, "Run 'kubeact actions' to list every action id")
            }
            ActionError::CommandFailed { code, .. } => CliError::CommandFailed {
                message,
                code,
                help: Some("Run with --debug to log every kubectl invocation".to_string()),
            },
            ActionError::Io(_)
            | ActionError::EmptyFile { .. }
            | ActionError::NoMatch { .. }
            | ActionError::Spawn { .. } => CliError::Io { message },
            _ => CliError::Other { message },
        }
    }
}

impl From<kubeact_core::CoreError> for CliError {
    fn from(err: kubeact_core::CoreError) -> Self {
        CliError::usage(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
