//! Bounded external process execution for the Kali tool server.
//!
//! The `kali-exec` crate owns every interaction with child processes. A
//! [`CommandSpec`] describes what to run (program, discrete argument vector,
//! optional stdin payload, and a wall-clock timeout); a [`CommandRunner`]
//! turns it into an [`ExecutionResult`].
//!
//! # Failure model
//!
//! Two outcomes are kept deliberately distinct:
//!
//! - the executor could not run the command at all (empty command, program
//!   not on the search path, timeout, permission denied, other launch
//!   failures). These are classified by [`ExecError`] and surface as a
//!   result whose exit code is [`NOT_RUN_EXIT_CODE`];
//! - the command ran and exited non-zero. That is a completed result whose
//!   [`ExecutionResult::success`] flag is `false`.
//!
//! Standard output and standard error share one pipe, so the captured text
//! preserves the interleaving a terminal user would have seen.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use kali_exec::{CommandRunner, CommandSpec, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let spec = CommandSpec::new("nmap")
//!     .args(["-sV", "-sC", "scanme.nmap.org"])
//!     .timeout(Duration::from_secs(300));
//! let result = runner.run(&spec);
//! println!("{}", result.output());
//! ```

pub mod command;
pub mod error;
pub mod outcome;
pub mod process;
pub mod resolve;
pub mod runner;

#[cfg(test)]
mod tests;

pub use self::command::{CommandSpec, DEFAULT_TIMEOUT};
pub use self::error::{ExecError, ExecErrorKind};
pub use self::outcome::{ExecutionResult, NOT_RUN_EXIT_CODE};
pub use self::process::{SystemRunner, terminate_active};
pub use self::resolve::resolve_program;
pub use self::runner::CommandRunner;
