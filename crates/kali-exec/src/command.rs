//! Command descriptions handed to a [`CommandRunner`](crate::CommandRunner).
//!
//! A [`CommandSpec`] is a plain value: the program name, a discrete argument
//! vector, an optional stdin payload, and the wall-clock budget. Arguments are
//! never joined into a shell string, so untrusted values cannot smuggle shell
//! syntax into the child.

use std::time::Duration;

/// Timeout applied when a spec does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Description of a single external command invocation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use kali_exec::CommandSpec;
///
/// let spec = CommandSpec::new("gobuster")
///     .args(["dir", "-u", "http://10.0.0.5"])
///     .timeout(Duration::from_secs(600));
/// assert_eq!(spec.program(), "gobuster");
/// assert_eq!(spec.arguments().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    input: Option<String>,
    timeout: Duration,
}

impl CommandSpec {
    /// Creates a spec for `program` with no arguments and the default timeout.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.args.push(argument.into());
        self
    }

    /// Appends several arguments in order.
    #[must_use]
    pub fn args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Sets the payload written to the child's stdin.
    #[must_use]
    pub fn input(mut self, payload: impl Into<String>) -> Self {
        self.input = Some(payload.into());
        self
    }

    /// Sets the wall-clock timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        self.program.as_str()
    }

    /// Arguments passed after the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Payload written to stdin, if any.
    #[must_use]
    pub fn stdin_payload(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Wall-clock budget for the run.
    #[must_use]
    pub const fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` when the program name is empty or whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.program.trim().is_empty()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for argument in &self.args {
            write!(f, " {argument}")?;
        }
        Ok(())
    }
}
