//! Error types raised while resolving and running an action invocation.

use std::{io, path::PathBuf};

use actionctl_api::ApiError;
use thiserror::Error;

/// Main error type for the invocation pipeline.
///
/// Every error raised while resolving parameters aborts the invocation before
/// anything is submitted. Collaborator errors are carried through unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An action, runner type or execution does not resolve.
    #[error("{message}")]
    NotFound { message: String },

    /// A parameter value failed its declared type coercion.
    #[error("{message}")]
    InvalidValue { name: String, message: String },

    /// A file-valued parameter points at something that cannot be read.
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    /// Help was requested for a parameter absent from the merged schema.
    #[error("Missing schema for parameter \"{name}\"")]
    MissingSchema { name: String },

    /// The execution service answered with an active execution lacking an id.
    #[error("execution service returned an execution without an id")]
    MissingExecutionId,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EngineError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for local not-found errors and collaborator 404s alike.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api(error) => error.is_not_found(),
            _ => false,
        }
    }
}

/// Errors related to reading file-valued parameters.
#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("File \"{}\" doesn't exist", .path.display())]
    Missing { path: PathBuf },

    #[error("\"{}\" is not a file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("Unable to read \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_collaborator_errors() {
        assert!(EngineError::not_found("gone").is_not_found());
        assert!(EngineError::from(ApiError::not_found("gone")).is_not_found());
        assert!(!EngineError::invalid_value("x", "bad").is_not_found());
    }

    #[test]
    fn file_access_messages_name_the_path() {
        let missing = FileAccessError::Missing {
            path: PathBuf::from("/tmp/nope.txt"),
        };
        assert_eq!(missing.to_string(), "File \"/tmp/nope.txt\" doesn't exist");
        let directory = FileAccessError::NotAFile { path: PathBuf::from("/tmp") };
        assert_eq!(directory.to_string(), "\"/tmp\" is not a file");
    }
}
