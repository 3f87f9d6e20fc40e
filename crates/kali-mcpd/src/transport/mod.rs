//! Line-delimited stdio transport.
//!
//! [`serve`] reads one request per line until end of input, hands each
//! non-blank line to the dispatcher, and writes exactly one response line
//! per request, flushing after each. Requests are handled strictly in order.
//!
//! Lines longer than [`MAX_REQUEST_BYTES`] are discarded up to the next
//! newline and answered with a parse error, so an oversized request cannot
//! exhaust memory.

use std::io::{self, BufRead, Write};

use kali_exec::CommandRunner;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::protocol::{ProtocolError, Response, ResponseWriter};

/// Tracing target for the transport loop.
pub(crate) const TRANSPORT_TARGET: &str = "kali_mcpd::transport";

/// Maximum size of a single request line in bytes.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Unrecoverable transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading the request stream failed.
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),
    /// Writing or flushing a response failed.
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

/// Outcome of reading one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    /// A complete line, or a final unterminated one, is in the buffer.
    Line,
    /// The line exceeded the limit and was discarded.
    Oversized,
    /// End of input with nothing pending.
    Eof,
}

/// Serves requests from `input` until end of input.
///
/// Returns the number of responses written.
///
/// # Errors
///
/// Returns a [`TransportError`] when reading the input or writing a response
/// fails. No further requests are processed after an error.
pub fn serve<C, R, W>(
    dispatcher: &Dispatcher<C>,
    mut input: R,
    output: W,
) -> Result<usize, TransportError>
where
    C: CommandRunner,
    R: BufRead,
    W: Write,
{
    let mut writer = ResponseWriter::new(output);
    let mut line = Vec::new();
    let mut answered = 0_usize;

    info!(target: TRANSPORT_TARGET, "serving requests on stdio");
    loop {
        let response = match read_bounded_line(&mut input, &mut line, MAX_REQUEST_BYTES)
            .map_err(TransportError::Read)?
        {
            LineRead::Eof => break,
            LineRead::Oversized => {
                warn!(
                    target: TRANSPORT_TARGET,
                    limit = MAX_REQUEST_BYTES,
                    "discarded oversized request line"
                );
                Response::error(
                    Value::Null,
                    &ProtocolError::parse(format!(
                        "request exceeds {MAX_REQUEST_BYTES} byte limit"
                    )),
                )
            }
            LineRead::Line if line.trim_ascii().is_empty() => continue,
            LineRead::Line => dispatcher.handle_line(&line),
        };

        writer
            .write_response(&response)
            .map_err(TransportError::Write)?;
        answered += 1;
    }

    debug!(target: TRANSPORT_TARGET, answered, "input closed");
    Ok(answered)
}

/// Writes a best-effort fatal error line after a transport failure.
pub fn write_fatal<W: Write>(output: W, error: &TransportError) {
    let response = Response::error(Value::Null, &ProtocolError::fatal(error.to_string()));
    if let Err(write_error) = ResponseWriter::new(output).write_response(&response) {
        warn!(target: TRANSPORT_TARGET, %write_error, "could not report fatal error");
    }
}

/// Reads up to the next newline into `line`, excluding the newline.
///
/// Bytes beyond `limit` are consumed and dropped rather than buffered.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    line: &mut Vec<u8>,
    limit: usize,
) -> io::Result<LineRead> {
    line.clear();
    let mut oversized = false;
    let mut consumed_any = false;

    loop {
        let (done, used) = {
            let available = match reader.fill_buf() {
                Ok(buffer) => buffer,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            if available.is_empty() {
                return Ok(match (consumed_any, oversized) {
                    (false, _) => LineRead::Eof,
                    (true, true) => LineRead::Oversized,
                    (true, false) => LineRead::Line,
                });
            }

            let newline = available.iter().position(|byte| *byte == b'\n');
            let (chunk, used) = match newline {
                Some(position) => (available.split_at(position).0, position + 1),
                None => (available, available.len()),
            };
            if !oversized {
                if line.len() + chunk.len() > limit {
                    oversized = true;
                    line.clear();
                } else {
                    line.extend_from_slice(chunk);
                }
            }
            (newline.is_some(), used)
        };

        reader.consume(used);
        consumed_any = true;
        if done {
            return Ok(if oversized {
                LineRead::Oversized
            } else {
                LineRead::Line
            });
        }
    }
}
