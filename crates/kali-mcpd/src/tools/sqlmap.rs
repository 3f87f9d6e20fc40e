//! `sqlmap_scan`: SQL injection testing.

use std::ops::RangeInclusive;
use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, not_installed, positional};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "sqlmap";
const TIMEOUT: Duration = Duration::from_secs(600);
const LEVELS: RangeInclusive<i64> = 1..=5;
const RISKS: RangeInclusive<i64> = 1..=3;

#[derive(Debug, Deserialize)]
struct Params {
    url: String,
    level: i64,
    risk: i64,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    url: &'a str,
    #[serde(flatten)]
    run: RunReport,
}

/// Runs `sqlmap` in batch mode against a URL.
#[derive(Debug, Clone)]
pub struct SqlmapScan {
    descriptor: ToolDescriptor,
}

impl SqlmapScan {
    /// Tool name.
    pub const NAME: &'static str = "sqlmap_scan";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor =
            ToolDescriptor::new(Self::NAME, "Test for SQL injection vulnerabilities")
                .required_param(ParamSpec::string("url", "Target URL to test"))
                .optional(ParamSpec::integer("level", "Scan level (1-5)").with_default(1))
                .optional(ParamSpec::integer("risk", "Risk level (1-3)").with_default(1));
        Self { descriptor }
    }
}

impl Default for SqlmapScan {
    fn default() -> Self {
        Self::new()
    }
}

fn bounded(name: &str, value: i64, range: &RangeInclusive<i64>) -> Result<String, ToolError> {
    if range.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ToolError::invalid_value(
            name,
            format!("{value} is outside {}..={}", range.start(), range.end()),
        ))
    }
}

fn command(params: &Params) -> Result<CommandSpec, ToolError> {
    let url = positional("url", &params.url)?;
    let level = bounded("level", params.level, &LEVELS)?;
    let risk = bounded("risk", params.risk, &RISKS)?;
    Ok(CommandSpec::new(PROGRAM)
        .args(["-u", url, "--batch", "--level", level.as_str(), "--risk", risk.as_str()])
        .timeout(TIMEOUT))
}

impl ToolHandler for SqlmapScan {
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

        let result = runner.run(&spec);
        into_payload(&Report {
            tool: PROGRAM,
            url: &params.url,
            run: RunReport::from(&result),
        })
    }
}

#[cfg(test)]
mod tests {
    use kali_exec::ExecutionResult;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::tools::test_support::{prepared, runner_expecting, runner_with};

    const URL: &str = "http://10.0.0.5/item.php?id=1";

    #[test]
    fn applies_default_level_and_risk() {
        let handler = SqlmapScan::new();
        let runner = runner_expecting(
            PROGRAM,
            &["-u", URL, "--batch", "--level", "1", "--risk", "1"],
            ExecutionResult::completed(0, "parameter 'id' is vulnerable\n"),
        );

        let payload = handler
            .call(prepared(&handler, json!({"url": URL})), &runner)
            .expect("call succeeds");

        assert_eq!(payload["url"], URL);
        assert_eq!(payload["tool"], "sqlmap");
    }

    #[test]
    fn forwards_explicit_level_and_risk() {
        let handler = SqlmapScan::new();
        let runner = runner_expecting(
            PROGRAM,
            &["-u", URL, "--batch", "--level", "5", "--risk", "3"],
            ExecutionResult::completed(0, ""),
        );

        handler
            .call(
                prepared(&handler, json!({"url": URL, "level": 5, "risk": 3})),
                &runner,
            )
            .expect("call succeeds");
    }

    #[rstest]
    #[case::level_high(json!({"url": URL, "level": 6}), "'level'")]
    #[case::level_zero(json!({"url": URL, "level": 0}), "'level'")]
    #[case::risk_high(json!({"url": URL, "risk": 4}), "'risk'")]
    fn out_of_range_values_are_invalid(#[case] arguments: Value, #[case] field: &str) {
        let handler = SqlmapScan::new();
        let runner = runner_with(&["sqlmap"]);

        let error = handler
            .call(prepared(&handler, arguments), &runner)
            .expect_err("value should be rejected");

        assert!(error.is_invalid_params());
        assert!(error.to_string().contains(field));
    }

    #[test]
    fn missing_binary_short_circuits() {
        let handler = SqlmapScan::new();
        let payload = handler
            .call(prepared(&handler, json!({"url": URL})), &runner_with(&[]))
            .expect("call succeeds");
        assert_eq!(
            payload["error"],
            "sqlmap not found. Install with: just install-kali-tools"
        );
    }
}
