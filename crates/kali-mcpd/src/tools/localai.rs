//! `analyze_with_localai`: hands text to a LocalAI chat model.
//!
//! The request goes through `curl` like every other tool, so it shares the
//! executor's timeout and kill-on-interrupt handling. The JSON body is fed on
//! stdin rather than the command line.

use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::report::{into_payload, notice};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "curl";
const TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TIME_SECS: &str = "60";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_URL: &str = "http://localhost:8080";
const TEMPERATURE: f64 = 0.3;

/// System prompt selected by `analysis_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Analysis {
    Security,
    Vulnerability,
    Report,
}

impl Analysis {
    /// Unrecognised names fall back to a security analysis.
    fn from_name(name: &str) -> Self {
        match name {
            "vulnerability" => Self::Vulnerability,
            "report" => Self::Report,
            _ => Self::Security,
        }
    }

    const fn system_prompt(self) -> &'static str {
        match self {
            Self::Security => {
                "You are a cybersecurity expert. Analyze the provided data and provide security insights."
            }
            Self::Vulnerability => {
                "You are a vulnerability assessment expert. Analyze the data and identify security vulnerabilities."
            }
            Self::Report => {
                "You are a cybersecurity consultant. Generate a professional security assessment report."
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    data: String,
    analysis_type: String,
    localai_url: String,
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    analysis_type: &'a str,
    output: String,
}

/// Sends data to a LocalAI endpoint for analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeWithLocalAi {
    descriptor: ToolDescriptor,
    model: String,
}

impl AnalyzeWithLocalAi {
    /// Tool name.
    pub const NAME: &'static str = "analyze_with_localai";

    /// Creates the handler, requesting `model` from the endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        let descriptor =
            ToolDescriptor::new(Self::NAME, "Send tool output to LocalAI for analysis")
                .required_param(ParamSpec::string("data", "Data to analyze"))
                .optional(
                    ParamSpec::string(
                        "analysis_type",
                        "Type of analysis (security, vulnerability, report)",
                    )
                    .with_default("security"),
                )
                .optional(
                    ParamSpec::string("localai_url", "LocalAI API URL").with_default(DEFAULT_URL),
                );
        Self {
            descriptor,
            model: model.into(),
        }
    }

    fn request_body(&self, params: &Params) -> String {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": Analysis::from_name(&params.analysis_type).system_prompt()
                },
                {"role": "user", "content": params.data}
            ],
            "temperature": TEMPERATURE
        })
        .to_string()
    }
}

fn endpoint(base: &str) -> Result<String, ToolError> {
    let lower = base.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ToolError::invalid_value(
            "localai_url",
            "must be an http:// or https:// URL",
        ));
    }
    Ok(format!("{}{COMPLETIONS_PATH}", base.trim_end_matches('/')))
}

fn failure(detail: &str) -> Value {
    notice(format!("Failed to connect to LocalAI: {}", detail.trim()))
}

impl ToolHandler for AnalyzeWithLocalAi {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        arguments: ToolArguments,
        runner: &dyn CommandRunner,
    ) -> Result<Value, ToolError> {
        let params: Params = arguments.parse()?;
        let url = endpoint(&params.localai_url)?;
        if !runner.is_available(PROGRAM) {
            return Ok(failure("curl is not installed"));
        }

        let spec = CommandSpec::new(PROGRAM)
            .args([
                "-sS",
                "--fail",
                "--max-time",
                MAX_TIME_SECS,
                "-H",
                "Content-Type: application/json",
                "--data-binary",
                "@-",
                url.as_str(),
            ])
            .input(self.request_body(&params))
            .timeout(TIMEOUT);

        let result = runner.run(&spec);
        if let Some(error) = result.error_text() {
            return Ok(failure(error));
        }

        let completion: Completion = match serde_json::from_str(result.output()) {
            Ok(completion) => completion,
            Err(error) => return Ok(failure(&format!("invalid response: {error}"))),
        };
        let output = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        into_payload(&Report {
            tool: "localai_analysis",
            analysis_type: &params.analysis_type,
            output,
        })
    }
}
