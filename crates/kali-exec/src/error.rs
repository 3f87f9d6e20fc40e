//! Classification of commands the executor could not run.
//!
//! Variants are listed in the order they are checked. A command that ran and
//! exited non-zero is not an [`ExecError`]; it is a completed
//! [`ExecutionResult`](crate::ExecutionResult) with `success == false`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Reasons the executor could not run a command to completion.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// The command had no program name.
    #[error("Empty command")]
    EmptyCommand,

    /// The program could not be resolved on the search path.
    #[error("Command not found: {program}")]
    NotFound {
        /// Program name as requested.
        program: String,
    },

    /// The command exceeded its wall-clock budget and was killed.
    #[error("Command timed out after {} seconds", .timeout.as_secs())]
    TimedOut {
        /// Program name as requested.
        program: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// The operating system refused to execute the program.
    #[error("Permission denied: {program}")]
    PermissionDenied {
        /// Program name as requested.
        program: String,
    },

    /// Any other launch or supervision failure.
    #[error("Error executing command: {source}")]
    Io {
        /// Program name as requested.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Closed set of executor failure categories, for branching without string
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecErrorKind {
    /// See [`ExecError::EmptyCommand`].
    EmptyCommand,
    /// See [`ExecError::NotFound`].
    NotFound,
    /// See [`ExecError::TimedOut`].
    TimedOut,
    /// See [`ExecError::PermissionDenied`].
    PermissionDenied,
    /// See [`ExecError::Io`].
    Other,
}

impl ExecError {
    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ExecErrorKind {
        match self {
            Self::EmptyCommand => ExecErrorKind::EmptyCommand,
            Self::NotFound { .. } => ExecErrorKind::NotFound,
            Self::TimedOut { .. } => ExecErrorKind::TimedOut,
            Self::PermissionDenied { .. } => ExecErrorKind::PermissionDenied,
            Self::Io { .. } => ExecErrorKind::Other,
        }
    }

    /// Classifies an I/O error raised while spawning or supervising
    /// `program`.
    #[must_use]
    pub fn from_io(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                program: program.to_owned(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                program: program.to_owned(),
            },
            _ => Self::Io {
                program: program.to_owned(),
                source: Arc::new(source),
            },
        }
    }
}
