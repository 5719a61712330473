//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid destination '{destination}': {message}")]
    InvalidDestination {
        destination: String,
        message: String,
    },

    #[error("Unknown context section '{section}' (expected ctx, secrets or parameters)")]
    UnknownSection { section: String },

    #[error("Cannot push to '{path}': target is not an array")]
    NotAnArray { path: String },

    #[error("Unable to resolve reference '{reference}'")]
    UnresolvedReference { reference: String },

    #[error("Invalid assignment '{arg}'. Expected key=value")]
    InvalidAssignment { arg: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
