use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use palaver::tool_loop::{handle_tool_calls, ToolHandler, ToolRegistry, MISSING_TOOL_MESSAGE};
use palaver::transport::{HttpResponse, HttpTransport, RequestDescription};
use palaver::{
    build_tool, Client, Error, Message, Provider, Role, ToolCall, ToolParameter,
    ToolParameterType,
};
use std::sync::Arc;

/// Transport that replays a scripted response sequence and records every
/// request it was asked to perform.
struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<RequestDescription>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<HttpResponse>) -> Self {
        ScriptedTransport {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request_body(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        serde_json::from_slice(&requests[index].body).unwrap()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &RequestDescription) -> Result<HttpResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted"))
    }
}

struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    async fn call(
        &self,
        arguments: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(format!("echo: {}", arguments))
    }
}

struct FailingTool;

#[async_trait]
impl ToolHandler for FailingTool {
    async fn call(
        &self,
        _arguments: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err("disk on fire".into())
    }
}

fn echo_schema() -> palaver::Tool {
    build_tool(
        "echo",
        "Echo the arguments back.",
        vec![ToolParameter::new("text", ToolParameterType::String, "Text").required()],
    )
}

fn ok_response(body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![],
        body: body.to_string().into_bytes(),
    }
}

fn tool_call_response(name: &str, call_id: &str) -> HttpResponse {
    ok_response(serde_json::json!({
        "id": "chatcmpl-loop",
        "object": "chat.completion",
        "created": 0,
        "model": "m",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": call_id,
                    "type": "function",
                    "function": { "name": name, "arguments": "{\"text\":\"hi\"}" }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
    }))
}

fn text_response(text: &str) -> HttpResponse {
    ok_response(serde_json::json!({
        "id": "chatcmpl-done",
        "object": "chat.completion",
        "created": 0,
        "model": "m",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
    }))
}

/// A client whose last message is an assistant message carrying one call to
/// `tool_name`.
fn client_with_pending_call(tool_name: &str) -> Client {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "m")
        .unwrap()
        .with_tool(echo_schema());
    client.add_user("please use a tool", false);
    let mut assistant = Message::assistant("", false);
    assistant.tool_calls.push(ToolCall::function(
        "call_0",
        tool_name,
        "{\"text\":\"hi\"}",
    ));
    client.messages.push(assistant);
    client
}

fn registry_with_echo() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(echo_schema(), Arc::new(EchoTool));
    registry
}

#[tokio::test]
async fn no_pending_tool_calls_issues_no_requests() {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "m").unwrap();
    client.add_user("hello", false);

    let transport = ScriptedTransport::new(vec![]);
    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 10)
        .await
        .unwrap();
    assert_eq!(transport.request_count(), 0);
    assert_eq!(client.messages.len(), 1);
}

#[tokio::test]
async fn zero_budget_leaves_client_untouched() {
    let mut client = client_with_pending_call("echo");
    let before = client.messages.clone();

    let transport = ScriptedTransport::new(vec![]);
    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 0)
        .await
        .unwrap();
    assert_eq!(transport.request_count(), 0);
    assert_eq!(client.messages, before);
}

#[tokio::test]
async fn dispatches_and_appends_tool_result() {
    let mut client = client_with_pending_call("echo");
    let transport = ScriptedTransport::new(vec![text_response("done")]);

    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 5)
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 1);
    // user, assistant(call), tool result, final assistant
    assert_eq!(client.messages.len(), 4);
    let result = &client.messages[2];
    assert_eq!(result.role, Role::Tool);
    assert_eq!(result.tool_call_id, "call_0");
    assert_eq!(result.name, "echo");
    assert_eq!(result.content, "echo: {\"text\":\"hi\"}");
    assert_eq!(client.messages[3].content, "done");
}

#[tokio::test]
async fn unknown_tool_gets_synthetic_result_and_loop_continues() {
    let mut client = client_with_pending_call("frob");
    let transport = ScriptedTransport::new(vec![text_response("ok then")]);

    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 5)
        .await
        .unwrap();

    let result = &client.messages[2];
    assert_eq!(result.role, Role::Tool);
    assert_eq!(result.content, MISSING_TOOL_MESSAGE);
    assert_eq!(result.tool_call_id, "call_0");
    assert_eq!(result.name, "frob");

    // The follow-up request still allows tool use while budget remains.
    assert_eq!(transport.request_body(0)["tool_choice"], "auto");
    assert_eq!(client.messages.last().unwrap().content, "ok then");
}

#[tokio::test]
async fn budget_bounds_the_number_of_requests() {
    let mut client = client_with_pending_call("echo");
    // Every response requests another tool call; only the budget stops us.
    let transport = ScriptedTransport::new(vec![
        tool_call_response("echo", "call_1"),
        tool_call_response("echo", "call_2"),
    ]);

    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 2)
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
    // The final assistant message still carries tool calls; the loop stops
    // anyway because the budget is spent.
    let last = client.messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(!last.tool_calls.is_empty());
    assert_eq!(transport.request_body(0)["tool_choice"], "auto");
    // Last permitted request forbids further tool calls.
    assert_eq!(transport.request_body(1)["tool_choice"], "none");
}

#[tokio::test]
async fn single_call_budget_forces_tool_choice_none() {
    let mut client = client_with_pending_call("echo");
    let transport = ScriptedTransport::new(vec![tool_call_response("echo", "call_1")]);

    handle_tool_calls(&mut client, &registry_with_echo(), &transport, 1)
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.request_body(0)["tool_choice"], "none");
}

#[tokio::test]
async fn http_error_mid_loop_keeps_partial_progress() {
    let mut client = client_with_pending_call("echo");
    let transport = ScriptedTransport::new(vec![
        tool_call_response("echo", "call_1"),
        HttpResponse {
            status: 500,
            headers: vec![],
            body: b"down".to_vec(),
        },
    ]);

    let outcome = handle_tool_calls(&mut client, &registry_with_echo(), &transport, 5).await;
    match outcome {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "down");
        }
        other => panic!("expected Http error, got {:?}", other),
    }

    assert_eq!(transport.request_count(), 2);
    // user, assistant(call_0), result(call_0), assistant(call_1),
    // result(call_1); the failed turn appends nothing further.
    assert_eq!(client.messages.len(), 5);
    assert_eq!(client.messages[4].role, Role::Tool);
    assert_eq!(client.messages[4].tool_call_id, "call_1");
}

#[tokio::test]
async fn handler_failure_aborts_and_keeps_earlier_results() {
    let mut registry = ToolRegistry::new();
    registry.register(echo_schema(), Arc::new(EchoTool));
    registry.register(
        build_tool("burn", "Always fails.", vec![]),
        Arc::new(FailingTool),
    );

    let mut client = Client::new(Provider::OpenAI, "sk-X", "m")
        .unwrap()
        .with_tools(registry.schemas().to_vec());
    client.add_user("go", false);
    let mut assistant = Message::assistant("", false);
    assistant
        .tool_calls
        .push(ToolCall::function("call_a", "echo", "{}"));
    assistant
        .tool_calls
        .push(ToolCall::function("call_b", "burn", "{}"));
    client.messages.push(assistant);

    let transport = ScriptedTransport::new(vec![]);
    let outcome = handle_tool_calls(&mut client, &registry, &transport, 5).await;
    match outcome {
        Err(Error::Handler { tool, message }) => {
            assert_eq!(tool, "burn");
            assert!(message.contains("disk on fire"));
        }
        other => panic!("expected Handler error, got {:?}", other),
    }

    // The echo result dispatched before the failure stays appended; no
    // request was ever issued.
    assert_eq!(transport.request_count(), 0);
    let last = client.messages.last().unwrap();
    assert_eq!(last.role, Role::Tool);
    assert_eq!(last.tool_call_id, "call_a");
}

#[tokio::test]
async fn registry_replaces_handlers_by_name() {
    let mut registry = ToolRegistry::new();
    registry.register(echo_schema(), Arc::new(EchoTool));
    registry.register(echo_schema(), Arc::new(EchoTool));
    assert_eq!(registry.len(), 1);
    assert!(registry.handler("echo").is_some());
    assert!(registry.handler("missing").is_none());
}
