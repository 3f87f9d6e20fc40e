//! `aircrack_crack`: WPA handshake cracking with aircrack-ng.

use std::time::Duration;

use camino::Utf8PathBuf;
use kali_exec::{CommandRunner, CommandSpec, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, missing_file, not_installed, positional};
use super::{DEFAULT_CRACK_WORDLIST, ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "aircrack-ng";
const TIMEOUT: Duration = Duration::from_secs(3600);
const KEY_MARKER: &str = "KEY FOUND";

#[derive(Debug, Deserialize)]
struct Params {
    capture_file: Utf8PathBuf,
    bssid: String,
    wordlist: Utf8PathBuf,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    capture_file: &'a Utf8PathBuf,
    bssid: &'a str,
    wordlist: &'a Utf8PathBuf,
    password: Option<String>,
    #[serde(flatten)]
    run: RunReport,
}

/// Runs `aircrack-ng` with a wordlist against a capture file.
#[derive(Debug, Clone)]
pub struct AircrackCrack {
    descriptor: ToolDescriptor,
}

impl AircrackCrack {
    /// Tool name.
    pub const NAME: &'static str = "aircrack_crack";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(Self::NAME, "Crack WiFi password with aircrack-ng")
            .required_param(ParamSpec::string("capture_file", "Path to .cap file"))
            .required_param(ParamSpec::string("bssid", "BSSID of target network"))
            .optional(
                ParamSpec::string("wordlist", "Wordlist path").with_default(DEFAULT_CRACK_WORDLIST),
            );
        Self { descriptor }
    }
}

impl Default for AircrackCrack {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the key from a successful run's `KEY FOUND! [ ... ]` line.
fn recovered_key(result: &ExecutionResult) -> Option<String> {
    if !result.success() {
        return None;
    }
    let output = result.output();
    let after_marker = output.get(output.find(KEY_MARKER)? + KEY_MARKER.len()..)?;
    let open = after_marker.find('[')?;
    let bracketed = after_marker.get(open + 1..)?;
    let close = bracketed.find(']')?;
    let key = bracketed.get(..close)?.trim();
    (!key.is_empty()).then(|| key.to_owned())
}

fn command(params: &Params) -> Result<CommandSpec, ToolError> {
    let bssid = positional("bssid", &params.bssid)?;
    let capture = positional("capture_file", params.capture_file.as_str())?;
    Ok(CommandSpec::new(PROGRAM)
        .args(["-w", params.wordlist.as_str(), "-b", bssid, capture])
        .timeout(TIMEOUT))
}

impl ToolHandler for AircrackCrack {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        arguments: ToolArguments,
        runner: &dyn CommandRunner,
    ) -> Result<Value, ToolError> {
        let params: Params = arguments.parse()?;
        let spec = command(&params)?;
        if !runner.is_available(PROGRAM) {
            return Ok(not_installed(PROGRAM));
        }
        if let Some(notice) = missing_file("Capture file", &params.capture_file)
            .or_else(|| missing_file("Wordlist", &params.wordlist))
        {
            return Ok(notice);
        }

        let result = runner.run(&spec);
        into_payload(&Report {
            tool: PROGRAM,
            capture_file: &params.capture_file,
            bssid: &params.bssid,
            wordlist: &params.wordlist,
            password: recovered_key(&result),
            run: RunReport::from(&result),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::tools::test_support::{MockRunner, prepared, runner_with};

    const BSSID: &str = "AA:BB:CC:DD:EE:FF";

    #[rstest]
    #[case::found(
        ExecutionResult::completed(0, "Opening capture.cap\n  KEY FOUND! [ hunter22 ]\n"),
        Some("hunter22")
    )]
    #[case::ignores_earlier_brackets(
        ExecutionResult::completed(0, "[00:00:01] 1024 keys tested\nKEY FOUND! [ s3cret ]\n"),
        Some("s3cret")
    )]
    #[case::not_found(
        ExecutionResult::completed(0, "[00:10:00] KEY NOT FOUND\n"),
        None
    )]
    #[case::failed_run(
        ExecutionResult::completed(1, "KEY FOUND! [ ignored ]\n"),
        None
    )]
    fn extracts_key_only_from_successful_runs(
        #[case] result: ExecutionResult,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(recovered_key(&result).as_deref(), expected);
    }

    #[test]
    fn reports_recovered_password() {
        let dir = TempDir::new().expect("temp dir");
        let capture = dir.path().join("handshake.cap");
        let words = dir.path().join("words.txt");
        fs::write(&capture, b"\xd4\xc3\xb2\xa1").expect("write capture");
        fs::write(&words, "hunter22\n").expect("write words");
        let capture = capture.to_str().expect("utf8").to_owned();
        let words = words.to_str().expect("utf8").to_owned();

        let expected = vec![
            String::from("-w"),
            words.clone(),
            String::from("-b"),
            String::from(BSSID),
            capture.clone(),
        ];
        let handler = AircrackCrack::new();
        let mut runner = MockRunner::new();
        runner
            .expect_is_available()
            .returning(|program: &str| program == PROGRAM);
        runner
            .expect_run()
            .withf(move |command: &CommandSpec| {
                command.program() == PROGRAM && command.arguments() == expected.as_slice()
            })
            .times(1)
            .return_once(|_| ExecutionResult::completed(0, "KEY FOUND! [ hunter22 ]\n"));

        let payload = handler
            .call(
                prepared(
                    &handler,
                    json!({"capture_file": capture, "bssid": BSSID, "wordlist": words}),
                ),
                &runner,
            )
            .expect("call succeeds");

        assert_eq!(payload["password"], "hunter22");
        assert_eq!(payload["bssid"], BSSID);
        assert_eq!(payload["tool"], "aircrack-ng");
        assert_eq!(payload["error"], Value::Null);
    }

    #[test]
    fn missing_capture_is_reported_without_running() {
        let handler = AircrackCrack::new();
        let payload = handler
            .call(
                prepared(
                    &handler,
                    json!({"capture_file": "/nonexistent/handshake.cap", "bssid": BSSID}),
                ),
                &runner_with(&["aircrack-ng"]),
            )
            .expect("call succeeds");

        assert_eq!(
            payload,
            json!({"error": "Capture file not found: /nonexistent/handshake.cap"})
        );
    }

    #[test]
    fn option_like_bssid_is_rejected() {
        let handler = AircrackCrack::new();
        let error = handler
            .call(
                prepared(
                    &handler,
                    json!({"capture_file": "/tmp/handshake.cap", "bssid": "-J/tmp/out"}),
                ),
                &runner_with(&["aircrack-ng"]),
            )
            .expect_err("bssid should be rejected");
        assert!(error.is_invalid_params());
    }
}
