//! Behavioural tests for request handling over the stdio transport.

use std::cell::RefCell;
use std::io::Cursor;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::dispatch::{Dispatcher, SERVER_NAME};
use crate::protocol::Response;
use crate::tools::test_support::{MockRunner, runner_with};
use crate::tools::{ToolSettings, builtin_registry};
use crate::transport::serve;

#[derive(Default)]
struct ServerWorld {
    dispatcher: Option<Dispatcher<MockRunner>>,
    responses: Vec<Response>,
}

impl ServerWorld {
    fn start_offline(&mut self) {
        let registry = builtin_registry(&ToolSettings::default()).expect("builtin registry");
        self.dispatcher = Some(Dispatcher::new(registry, runner_with(&[])));
    }

    fn send(&mut self, lines: &[&str]) {
        let dispatcher = self.dispatcher.as_ref().expect("server started");
        let mut input = lines.join("\n");
        input.push('\n');
        let mut output = Vec::new();
        serve(dispatcher, Cursor::new(input.into_bytes()), &mut output).expect("serve");

        self.responses = String::from_utf8(output)
            .expect("utf8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("response json"))
            .collect();
    }

    fn call(&mut self, tool: &str, arguments: &Value) {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": tool, "arguments": arguments},
        });
        self.send(&[&request.to_string()]);
    }

    fn first(&self) -> &Response {
        self.responses.first().expect("a response")
    }

    fn last(&self) -> &Response {
        self.responses.last().expect("a response")
    }
}

fn error_code(response: &Response) -> i64 {
    response.error_object().expect("error response").code
}

#[fixture]
fn world() -> RefCell<ServerWorld> {
    RefCell::new(ServerWorld::default())
}

#[given("a server with no tools installed")]
fn given_offline_server(world: &RefCell<ServerWorld>) {
    world.borrow_mut().start_offline();
}

#[when("the client sends a tools/list request")]
fn when_tools_list(world: &RefCell<ServerWorld>) {
    world
        .borrow_mut()
        .send(&[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#]);
}

#[when("the client calls {tool} against {target}")]
fn when_call_with_target(world: &RefCell<ServerWorld>, tool: String, target: String) {
    world.borrow_mut().call(&tool, &json!({"target": target}));
}

#[when("the client calls {tool} with no arguments")]
fn when_call_without_arguments(world: &RefCell<ServerWorld>, tool: String) {
    world.borrow_mut().call(&tool, &json!({}));
}

#[when("the client sends a malformed line and then an initialize request")]
fn when_malformed_then_initialize(world: &RefCell<ServerWorld>) {
    world
        .borrow_mut()
        .send(&["{\"jsonrpc\":", r#"{"jsonrpc":"2.0","id":2,"method":"initialize"}"#]);
}

#[then("the response count is {count}")]
fn then_response_count(world: &RefCell<ServerWorld>, count: usize) {
    let world = world.borrow();
    assert_eq!(world.responses.len(), count, "{:?}", world.responses);
}

#[then("the response lists {count} tools")]
fn then_lists_tools(world: &RefCell<ServerWorld>, count: usize) {
    let world = world.borrow();
    let tools = world.last().result().expect("result")["tools"]
        .as_array()
        .map(Vec::len);
    assert_eq!(tools, Some(count));
}

#[then("the tool payload reports {program} not found")]
fn then_payload_not_found(world: &RefCell<ServerWorld>, program: String) {
    let world = world.borrow();
    let text = world.last().result().expect("result")["content"][0]["text"]
        .as_str()
        .expect("text block")
        .to_owned();
    let payload: Value = serde_json::from_str(&text).expect("payload json");
    let message = payload["error"].as_str().expect("error field");
    assert!(
        message.starts_with(&format!("{program} not found")),
        "unexpected payload: {payload}"
    );
}

#[then("the response carries error code {code}")]
fn then_error_code(world: &RefCell<ServerWorld>, code: i64) {
    assert_eq!(error_code(world.borrow().last()), code);
}

#[then("the first response carries error code {code}")]
fn then_first_error_code(world: &RefCell<ServerWorld>, code: i64) {
    assert_eq!(error_code(world.borrow().first()), code);
}

#[then("the last response announces the server")]
fn then_announces_server(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    let result = world.last().result().expect("result");
    assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
}

#[scenario(path = "tests/features/server.feature", name = "Listing the tool catalog")]
fn lists_tool_catalog(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/server.feature", name = "Calling a tool whose binary is missing")]
fn reports_missing_binary(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/server.feature", name = "Calling an unknown tool")]
fn rejects_unknown_tool(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/server.feature", name = "Omitting a required parameter")]
fn rejects_missing_parameter(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/server.feature", name = "Recovering from a malformed line")]
fn recovers_from_malformed_line(world: RefCell<ServerWorld>) {
    drop(world);
}
