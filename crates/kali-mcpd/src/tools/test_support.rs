//! Doubles shared by handler and dispatcher tests.

use kali_exec::{CommandRunner, CommandSpec, ExecutionResult};
use mockall::mock;
use serde_json::{Map, Value};

use super::{ToolArguments, ToolHandler};

mock! {
    pub Runner {}
    impl CommandRunner for Runner {
        fn is_available(&self, program: &str) -> bool;
        fn run(&self, command: &CommandSpec) -> ExecutionResult;
    }
}

/// Runner on which only the listed programs are installed and nothing may be
/// run.
pub fn runner_with(installed: &'static [&'static str]) -> MockRunner {
    let mut runner = MockRunner::new();
    runner
        .expect_is_available()
        .returning(move |program: &str| installed.iter().any(|name| *name == program));
    runner.expect_run().never();
    runner
}

/// Runner on which only `program` is installed and which expects exactly one
/// run whose argv equals `argv`, answering with `result`.
pub fn runner_expecting(
    program: &'static str,
    argv: &'static [&'static str],
    result: ExecutionResult,
) -> MockRunner {
    let mut runner = MockRunner::new();
    runner
        .expect_is_available()
        .returning(move |candidate: &str| candidate == program);
    runner
        .expect_run()
        .withf(move |command: &CommandSpec| {
            command.program() == program && command.arguments() == argv
        })
        .times(1)
        .return_once(move |_| result);
    runner
}

/// Validates `arguments` against `handler`'s schema, as the dispatcher
/// would, and returns them ready for [`ToolHandler::call`].
pub fn prepared(handler: &dyn ToolHandler, arguments: Value) -> ToolArguments {
    let map = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    handler
        .descriptor()
        .prepare(&map)
        .expect("arguments should satisfy the schema")
}
