//! Process-backed command execution.
//!
//! [`SystemRunner`] implements [`CommandRunner`] by resolving the program on
//! the search path, spawning it in its own process group with stdout and
//! stderr sharing one pipe, feeding the optional stdin payload, and polling
//! for exit until the deadline. A supervision guard owns the child for the
//! whole run and kills the group on every path that does not end in a reaped
//! exit.

use std::io::{self, PipeReader, PipeWriter, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::error::ExecError;
use crate::outcome::{ExecutionResult, NOT_RUN_EXIT_CODE};
use crate::resolve::resolve_program;
use crate::runner::CommandRunner;

/// Tracing target for process execution.
const EXEC_TARGET: &str = "kali_exec::process";

/// Upper bound applied to any requested timeout.
const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// First and last sleep between exit polls.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(5);
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time allowed for the output pipe to drain after the child exits.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

const READ_CHUNK: usize = 8 * 1024;

/// Most recent output kept per run; earlier bytes are dropped.
const OUTPUT_LIMIT: usize = 8 * 1024 * 1024;

/// Process id of the child currently being supervised, or zero.
static ACTIVE_CHILD: AtomicU32 = AtomicU32::new(0);

/// Runs commands as real child processes.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use kali_exec::{CommandRunner, CommandSpec, SystemRunner};
///
/// let runner = SystemRunner::new();
/// let result = runner.run(
///     &CommandSpec::new("iwlist")
///         .args(["wlan0", "scan"])
///         .timeout(Duration::from_secs(30)),
/// );
/// if !result.success() {
///     eprintln!("{}", result.errors());
/// }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs `spec`, returning the exit code and merged output on completion.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecError`] when the command is empty, the program cannot
    /// be resolved, the timeout elapses, execution is not permitted, or any
    /// other I/O failure prevents the run from completing.
    pub fn execute(&self, spec: &CommandSpec) -> Result<(i32, String), ExecError> {
        if spec.is_empty() {
            return Err(ExecError::EmptyCommand);
        }

        let program = spec.program();
        let resolved = resolve_program(program).ok_or_else(|| ExecError::NotFound {
            program: program.to_owned(),
        })?;

        let (reader, writer) = io::pipe().map_err(|err| ExecError::from_io(program, err))?;
        let writer_err = writer
            .try_clone()
            .map_err(|err| ExecError::from_io(program, err))?;

        debug!(
            target: EXEC_TARGET,
            program,
            executable = %resolved.display(),
            arguments = spec.arguments().len(),
            timeout_secs = spec.timeout_duration().as_secs(),
            "spawning command"
        );

        let started = Instant::now();
        let child = spawn(&resolved, spec, writer, writer_err)?;
        let mut supervised = SupervisedChild::new(program, child);
        let capture = OutputCapture::start(program, reader, OUTPUT_LIMIT)?;

        if let Some(payload) = spec.stdin_payload() {
            supervised.feed_stdin(payload)?;
        }

        let budget = spec.timeout_duration().min(MAX_TIMEOUT);
        let status = supervised.wait_with_deadline(budget)?;
        drop(supervised);

        let output = capture.finish(DRAIN_GRACE);
        let code = exit_code(status);

        debug!(
            target: EXEC_TARGET,
            program,
            code,
            output_bytes = output.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "command exited"
        );

        Ok((code, output))
    }
}

impl CommandRunner for SystemRunner {
    fn is_available(&self, program: &str) -> bool {
        resolve_program(program).is_some()
    }

    fn run(&self, command: &CommandSpec) -> ExecutionResult {
        match self.execute(command) {
            Ok((code, output)) => ExecutionResult::completed(code, output),
            Err(error) => {
                warn!(
                    target: EXEC_TARGET,
                    program = command.program(),
                    %error,
                    "command did not complete"
                );
                ExecutionResult::failed(error)
            }
        }
    }
}

/// Kills the process group of the command currently being supervised, if
/// any.
///
/// Intended for signal handlers that are about to exit the server.
pub fn terminate_active() {
    let pid = ACTIVE_CHILD.load(Ordering::SeqCst);
    if pid == 0 {
        return;
    }
    warn!(target: EXEC_TARGET, pid, "terminating in-flight command");
    kill_group(pid);
}

fn spawn(
    executable: &Path,
    spec: &CommandSpec,
    stdout: PipeWriter,
    stderr: PipeWriter,
) -> Result<Child, ExecError> {
    let mut command = Command::new(executable);
    command
        .args(spec.arguments())
        .stdout(stdout)
        .stderr(stderr)
        .stdin(if spec.stdin_payload().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    // The command owns the parent's copies of the pipe writers; they close
    // when it drops at the end of this function.
    command
        .spawn()
        .map_err(|err| ExecError::from_io(spec.program(), err))
}

/// Owns a running child and guarantees it is killed and reaped.
struct SupervisedChild {
    program: String,
    child: Child,
    reaped: bool,
}

impl SupervisedChild {
    fn new(program: &str, child: Child) -> Self {
        ACTIVE_CHILD.store(child.id(), Ordering::SeqCst);
        Self {
            program: program.to_owned(),
            child,
            reaped: false,
        }
    }

    /// Writes the payload on a helper thread so a child that never reads
    /// stdin cannot stall the deadline loop.
    fn feed_stdin(&mut self, payload: &str) -> Result<(), ExecError> {
        let Some(mut stdin) = self.child.stdin.take() else {
            return Ok(());
        };
        let bytes = payload.as_bytes().to_vec();
        let program = self.program.clone();
        thread::Builder::new()
            .name(String::from("kali-exec-stdin"))
            .spawn(move || {
                if let Err(error) = stdin.write_all(&bytes).and_then(|()| stdin.flush()) {
                    debug!(target: EXEC_TARGET, program, %error, "stdin write failed");
                }
            })
            .map(drop)
            .map_err(|err| ExecError::from_io(&self.program, err))
    }

    fn wait_with_deadline(&mut self, timeout: Duration) -> Result<ExitStatus, ExecError> {
        let started = Instant::now();
        let mut interval = MIN_POLL_INTERVAL;

        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.reaped = true;
                    // Background members of the group must not outlive the run.
                    kill_group(self.child.id());
                    return Ok(status);
                }
                Ok(None) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        warn!(
                            target: EXEC_TARGET,
                            program = self.program.as_str(),
                            timeout_secs = timeout.as_secs(),
                            "command timed out, killing process group"
                        );
                        self.terminate();
                        return Err(ExecError::TimedOut {
                            program: self.program.clone(),
                            timeout,
                        });
                    }
                    thread::sleep(interval.min(timeout.saturating_sub(elapsed)));
                    interval = (interval * 2).min(MAX_POLL_INTERVAL);
                }
                Err(err) => return Err(ExecError::from_io(&self.program, err)),
            }
        }
    }

    fn terminate(&mut self) {
        kill_group(self.child.id());
        if let Err(error) = self.child.kill() {
            debug!(target: EXEC_TARGET, %error, "direct kill failed");
        }
        if let Err(error) = self.child.wait() {
            debug!(target: EXEC_TARGET, %error, "reaping killed child failed");
        }
        self.reaped = true;
    }
}

impl Drop for SupervisedChild {
    fn drop(&mut self) {
        if !self.reaped {
            self.terminate();
        }
        ACTIVE_CHILD.store(0, Ordering::SeqCst);
    }
}

/// Collects the shared stdout/stderr pipe on a helper thread.
struct OutputCapture {
    buffer: Arc<Mutex<TailBuffer>>,
    done: Receiver<()>,
}

impl OutputCapture {
    fn start(program: &str, mut reader: PipeReader, limit: usize) -> Result<Self, ExecError> {
        let buffer = Arc::new(Mutex::new(TailBuffer::new(limit)));
        let sink = Arc::clone(&buffer);
        let (done_tx, done) = mpsc::channel();

        thread::Builder::new()
            .name(String::from("kali-exec-output"))
            .spawn(move || {
                let mut chunk = vec![0_u8; READ_CHUNK];
                loop {
                    match reader.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(read) => {
                            let mut guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
                            guard.push(chunk.get(..read).unwrap_or_default());
                        }
                        Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                        Err(_) => break,
                    }
                }
                done_tx.send(()).ok();
            })
            .map_err(|err| ExecError::from_io(program, err))?;

        Ok(Self { buffer, done })
    }

    /// Waits up to `grace` for end-of-stream, then returns what was read.
    ///
    /// Grandchildren that inherited the pipe can keep it open after the
    /// direct child exits; the grace period bounds that wait.
    fn finish(self, grace: Duration) -> String {
        if self.done.recv_timeout(grace).is_err() {
            debug!(target: EXEC_TARGET, "output pipe still open after exit");
        }
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.take_text()
    }
}

/// Keeps the last `limit` bytes written to it.
#[derive(Debug)]
struct TailBuffer {
    bytes: Vec<u8>,
    limit: usize,
    dropped: usize,
}

impl TailBuffer {
    const fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
        // Trim lazily so steady output does not shift the buffer per chunk.
        if self.bytes.len() > self.limit.saturating_mul(2) {
            self.trim();
        }
    }

    fn trim(&mut self) {
        let excess = self.bytes.len().saturating_sub(self.limit);
        if excess > 0 {
            self.bytes.drain(..excess);
            self.dropped = self.dropped.saturating_add(excess);
        }
    }

    fn take_text(&mut self) -> String {
        self.trim();
        let tail = String::from_utf8_lossy(&self.bytes);
        if self.dropped == 0 {
            tail.into_owned()
        } else {
            format!("[output truncated: first {} bytes dropped]\n{tail}", self.dropped)
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(NOT_RUN_EXIT_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(NOT_RUN_EXIT_CODE)
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(errno) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(target: EXEC_TARGET, pid, %errno, "process group kill failed");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_buffer_keeps_short_output_whole() {
        let mut buffer = TailBuffer::new(16);
        buffer.push(b"PORT   STATE\n");
        assert_eq!(buffer.take_text(), "PORT   STATE\n");
    }

    #[test]
    fn tail_buffer_keeps_the_most_recent_bytes() {
        let mut buffer = TailBuffer::new(4);
        for chunk in [b"0123".as_slice(), b"4567", b"89"] {
            buffer.push(chunk);
        }
        assert_eq!(
            buffer.take_text(),
            "[output truncated: first 6 bytes dropped]\n6789"
        );
    }

    #[test]
    fn capture_stops_at_the_limit() {
        let (reader, mut writer) = io::pipe().expect("pipe");
        let capture = OutputCapture::start("test", reader, 8).expect("start capture");
        writer.write_all(&[b'a'; 64]).expect("write");
        writer.write_all(b"complete").expect("write");
        drop(writer);

        let output = capture.finish(Duration::from_secs(5));
        assert!(output.starts_with("[output truncated: first 64 bytes dropped]"), "{output}");
        assert!(output.ends_with("\ncomplete"), "{output}");
    }
}
