//! `wifi_scan`: wireless network discovery.

use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, notice, positional};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const IWLIST: &str = "iwlist";
const IW: &str = "iw";
const TIMEOUT: Duration = Duration::from_secs(30);
const NOT_INSTALLED: &str = "WiFi scanning tools not found. Install wireless-tools or iw";

#[derive(Debug, Deserialize)]
struct Params {
    interface: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    interface: &'a str,
    #[serde(flatten)]
    run: RunReport,
}

/// Scans for access points with `iwlist`, falling back to `iw`.
#[derive(Debug, Clone)]
pub struct WifiScan {
    descriptor: ToolDescriptor,
}

impl WifiScan {
    /// Tool name.
    pub const NAME: &'static str = "wifi_scan";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(Self::NAME, "Scan for WiFi networks").optional(
            ParamSpec::string("interface", "WiFi interface (e.g., wlan0)").with_default("wlan0"),
        );
        Self { descriptor }
    }
}

impl Default for WifiScan {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for WifiScan {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        arguments: ToolArguments,
        runner: &dyn CommandRunner,
    ) -> Result<Value, ToolError> {
        let params: Params = arguments.parse()?;
        let interface = positional("interface", &params.interface)?;

        let spec = if runner.is_available(IWLIST) {
            CommandSpec::new(IWLIST).args([interface, "scan"])
        } else if runner.is_available(IW) {
            CommandSpec::new(IW).args(["dev", interface, "scan"])
        } else {
            return Ok(notice(NOT_INSTALLED));
        };

        let result = runner.run(&spec.timeout(TIMEOUT));
        into_payload(&Report {
            tool: "wifi_scan",
            interface,
            run: RunReport::from(&result),
        })
    }
}

#[cfg(test)]
mod tests {
    use kali_exec::ExecutionResult;
    use serde_json::json;

    use super::*;
    use crate::tools::test_support::{prepared, runner_expecting, runner_with};

    #[test]
    fn prefers_iwlist_on_default_interface() {
        let handler = WifiScan::new();
        let runner = runner_expecting(
            IWLIST,
            &["wlan0", "scan"],
            ExecutionResult::completed(0, "Cell 01 - Address: AA:BB:CC:DD:EE:FF\n"),
        );

        let payload = handler
            .call(prepared(&handler, json!({})), &runner)
            .expect("call succeeds");

        assert_eq!(payload["interface"], "wlan0");
        assert_eq!(payload["tool"], "wifi_scan");
    }

    #[test]
    fn falls_back_to_iw() {
        let handler = WifiScan::new();
        let runner = runner_expecting(
            IW,
            &["dev", "wlan1", "scan"],
            ExecutionResult::completed(0, "BSS aa:bb:cc:dd:ee:ff(on wlan1)\n"),
        );

        let payload = handler
            .call(prepared(&handler, json!({"interface": "wlan1"})), &runner)
            .expect("call succeeds");

        assert_eq!(payload["interface"], "wlan1");
    }

    #[test]
    fn reports_missing_wireless_tools() {
        let handler = WifiScan::new();
        let payload = handler
            .call(prepared(&handler, json!({})), &runner_with(&[]))
            .expect("call succeeds");
        assert_eq!(payload, json!({"error": NOT_INSTALLED}));
    }

    #[test]
    fn scan_failure_keeps_output_as_error() {
        let handler = WifiScan::new();
        let runner = runner_expecting(
            IWLIST,
            &["wlan0", "scan"],
            ExecutionResult::completed(255, "wlan0     Interface doesn't support scanning.\n"),
        );

        let payload = handler
            .call(prepared(&handler, json!({})), &runner)
            .expect("call succeeds");

        assert_eq!(
            payload["error"],
            "wlan0     Interface doesn't support scanning.\n"
        );
    }
}
