//! Per-message and per-tool wire encoding.
//!
//! Message bodies are heterogeneous: a message marked `cached` ships its
//! content as a one-element content-block array carrying a `cache_control`
//! annotation, every other message ships a plain string. Tool schemas are
//! keyed by an open vocabulary of parameter names. Both are therefore built
//! as JSON values and inserted into the request body structurally, which
//! keeps the emitted body well-formed by construction.

use serde_json::{json, Map, Value};

use crate::palaver::client::Provider;
use crate::palaver::wire::{Message, Role, Tool, ToolChoice};

/// Does this provider understand `cache_control` content blocks?
///
/// OpenRouter passes them through to Anthropic models and the Anthropic
/// Messages API takes them natively; the other providers reject or ignore
/// the annotation, so for them content is always a plain string.
fn honours_prompt_cache(provider: &Provider) -> bool {
    matches!(provider, Provider::OpenRouter | Provider::Anthropic)
}

/// Encode one message into its wire object.
///
/// `cached` is honoured only on messages that are not tool results and only
/// for providers that understand the annotation; everything else serialises
/// with plain string content.
pub(crate) fn encode_message(message: &Message, provider: &Provider) -> Value {
    if message.cached && message.tool_call_id.is_empty() && honours_prompt_cache(provider) {
        let mut object = Map::new();
        object.insert("role".to_string(), json!(message.role));
        object.insert(
            "content".to_string(),
            json!([{
                "type": "text",
                "text": message.content,
                "cache_control": { "type": "ephemeral" },
            }]),
        );
        if !message.tool_calls.is_empty() {
            object.insert("tool_calls".to_string(), json!(message.tool_calls));
        }
        if !message.name.is_empty() {
            object.insert("name".to_string(), json!(message.name));
        }
        Value::Object(object)
    } else {
        // The derived form already omits empty optionals.
        json!(message)
    }
}

/// Encode the message array for a request body.
///
/// `strip_system` removes system-role messages (Anthropic, where their
/// content has already been folded into the top-level `system` field).
pub(crate) fn encode_messages(
    messages: &[Message],
    provider: &Provider,
    strip_system: bool,
) -> Vec<Value> {
    messages
        .iter()
        .filter(|message| !(strip_system && message.role == Role::System))
        .map(|message| encode_message(message, provider))
        .collect()
}

/// The JSON Schema object shared by both tool wire shapes.
fn parameters_schema(tool: &Tool) -> Value {
    let mut properties = Map::new();
    for parameter in &tool.parameters {
        properties.insert(
            parameter.name.clone(),
            json!({
                "type": parameter.param_type.as_str(),
                "description": parameter.description,
            }),
        );
    }
    let required: Vec<&str> = tool
        .parameters
        .iter()
        .filter(|parameter| parameter.required)
        .map(|parameter| parameter.name.as_str())
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Encode one tool schema in the provider's dialect.
pub(crate) fn encode_tool(tool: &Tool, provider: &Provider) -> Value {
    match provider {
        Provider::Anthropic => json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": parameters_schema(tool),
        }),
        _ => json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": parameters_schema(tool),
            },
        }),
    }
}

/// Encode the full tools array.
pub(crate) fn encode_tools(tools: &[Tool], provider: &Provider) -> Value {
    Value::Array(tools.iter().map(|tool| encode_tool(tool, provider)).collect())
}

/// Encode the tool-choice policy, or `None` when nothing should be emitted.
///
/// Anthropic has no "none" atom; that policy is expressed by omitting the
/// key entirely.
pub(crate) fn encode_tool_choice(choice: &ToolChoice, provider: &Provider) -> Option<Value> {
    match (provider, choice) {
        (Provider::Anthropic, ToolChoice::None) => None,
        (Provider::Anthropic, ToolChoice::Auto) => Some(json!({ "type": "auto" })),
        (_, ToolChoice::None) => Some(json!("none")),
        (_, ToolChoice::Auto) => Some(json!("auto")),
        (_, ToolChoice::Tool(name)) => Some(json!({
            "type": "function",
            "function": { "name": name },
        })),
    }
}
