//! The execution seam used by tool handlers.
//!
//! Handlers depend on [`CommandRunner`] rather than on [`SystemRunner`]
//! directly, so tests can substitute doubles that never spawn a process.
//!
//! [`SystemRunner`]: crate::SystemRunner

use crate::command::CommandSpec;
use crate::outcome::ExecutionResult;

/// Runs commands and reports whether programs are installed.
///
/// # Example
///
/// ```
/// use kali_exec::{CommandRunner, CommandSpec, ExecutionResult};
///
/// struct Canned;
///
/// impl CommandRunner for Canned {
///     fn is_available(&self, program: &str) -> bool {
///         program == "nmap"
///     }
///
///     fn run(&self, _command: &CommandSpec) -> ExecutionResult {
///         ExecutionResult::completed(0, "Host is up\n")
///     }
/// }
///
/// let runner = Canned;
/// assert!(runner.is_available("nmap"));
/// assert!(runner.run(&CommandSpec::new("nmap")).success());
/// ```
pub trait CommandRunner {
    /// Returns `true` when `program` resolves on the search path.
    fn is_available(&self, program: &str) -> bool;

    /// Runs `command` to completion or until its timeout elapses.
    fn run(&self, command: &CommandSpec) -> ExecutionResult;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn is_available(&self, program: &str) -> bool {
        (**self).is_available(program)
    }

    fn run(&self, command: &CommandSpec) -> ExecutionResult {
        (**self).run(command)
    }
}
