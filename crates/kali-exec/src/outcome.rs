//! Outcome of running one command.

use crate::error::{ExecError, ExecErrorKind};

/// Exit code recorded when the process never ran.
pub const NOT_RUN_EXIT_CODE: i32 = -1;

/// What happened when a command was handed to the executor.
///
/// For completed runs `errors` mirrors `output`, since both streams were
/// merged into the same pipe. For runs that never completed `output` is empty
/// and `errors` holds the classification message.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    success: bool,
    output: String,
    errors: String,
    exit_code: i32,
    failure: Option<ExecError>,
}

impl ExecutionResult {
    /// Builds the result of a process that ran to completion.
    #[must_use]
    pub fn completed(exit_code: i32, output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            success: exit_code == 0,
            errors: output.clone(),
            output,
            exit_code,
            failure: None,
        }
    }

    /// Builds the result of a command the executor could not run.
    #[must_use]
    pub fn failed(error: ExecError) -> Self {
        Self {
            success: false,
            output: String::new(),
            errors: error.to_string(),
            exit_code: NOT_RUN_EXIT_CODE,
            failure: Some(error),
        }
    }

    /// `true` when the process ran and exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Merged stdout/stderr text.
    #[must_use]
    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    /// Error text: the merged output for completed runs, or the executor's
    /// classification message otherwise.
    #[must_use]
    pub fn errors(&self) -> &str {
        self.errors.as_str()
    }

    /// Error text when the run was not successful.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.errors())
        }
    }

    /// Exit status, or [`NOT_RUN_EXIT_CODE`] when the process never ran.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Category of the executor failure, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<ExecErrorKind> {
        self.failure.as_ref().map(ExecError::kind)
    }
}
