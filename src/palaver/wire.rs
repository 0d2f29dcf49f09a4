//! Provider-agnostic wire types.
//!
//! Every provider adapter in this crate translates between its vendor's JSON
//! dialect and the types defined here: [`Message`] for conversation entries,
//! [`ToolCall`] for native function-calling requests made by the model,
//! [`Tool`] for the schemas advertised to the model, and [`Response`] for the
//! unified completion shape handed back to callers.
//!
//! # Example
//!
//! ```rust
//! use palaver::wire::{build_tool, Message, ToolParameter, ToolParameterType};
//!
//! let tool = build_tool(
//!     "get_weather",
//!     "Look up the current weather for a city.",
//!     vec![ToolParameter::new("city", ToolParameterType::String, "City name").required()],
//! );
//! assert_eq!(tool.name, "get_weather");
//!
//! let msg = Message::user("Hello, computer!", false);
//! assert!(msg.tool_calls.is_empty());
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Role attached to a [`Message`].
///
/// Serialises as the lowercase role string every chat-completions dialect
/// expects (`"system"`, `"user"`, `"assistant"`, `"tool"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A system authored message that primes or constrains assistant behaviour.
    System,
    /// A user authored message.
    User,
    /// An assistant authored message, possibly carrying [`ToolCall`]s.
    Assistant,
    /// A tool-result message correlating with a prior assistant [`ToolCall`].
    Tool,
}

/// The function half of a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name matching one of the [`Tool`]s sent in the request.
    pub name: String,
    /// Raw JSON object text produced by the model. Handlers parse this
    /// themselves; the core never interprets it.
    #[serde(default)]
    pub arguments: String,
}

/// A single tool call returned by the model in a native function-calling
/// response.
///
/// Providers assign an opaque [`id`](ToolCall::id) to each call so that the
/// tool result can be correlated back in a follow-up `Role::Tool` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call ID, e.g. `"call_abc123"`.
    pub id: String,
    /// Call kind. Always `"function"` for the providers this crate speaks to.
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// The requested function and its serialized arguments.
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Construct a `"function"` kind call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        ToolCall {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// One entry in a conversation, uniform across providers.
///
/// Optional fields use their empty value to mean "absent"; the encoder omits
/// them from the wire form entirely (never `null`). The `cached` flag is
/// request-shaping state, not wire data: when set on a non-tool-result
/// message it asks the encoder to emit the content as an ephemerally
/// cacheable content block. Providers that do not honour prompt caching
/// simply receive the plain string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    /// Native tool calls requested by the assistant. Non-empty only on
    /// assistant messages decoded from a provider response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool name on tool-result messages; empty means absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Correlating call ID on tool-result messages; empty means absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_call_id: String,
    /// Request this message be sent as an ephemerally cacheable content block.
    #[serde(skip)]
    pub cached: bool,
}

/// Some providers serialise an assistant message that only carries tool calls
/// with `"content": null`; fold that into the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    fn text(role: Role, content: impl Into<String>, cached: bool) -> Self {
        Message {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            name: String::new(),
            tool_call_id: String::new(),
            cached,
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>, cached: bool) -> Self {
        Message::text(Role::System, content, cached)
    }

    /// A user message.
    pub fn user(content: impl Into<String>, cached: bool) -> Self {
        Message::text(Role::User, content, cached)
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>, cached: bool) -> Self {
        Message::text(Role::Assistant, content, cached)
    }

    /// A tool-result message answering the call identified by `call_id`.
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            name: tool_name.into(),
            tool_call_id: call_id.into(),
            cached: false,
        }
    }
}

/// JSON type of a [`ToolParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ToolParameterType {
    /// The JSON Schema type string for this parameter type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolParameterType::String => "string",
            ToolParameterType::Number => "number",
            ToolParameterType::Integer => "integer",
            ToolParameterType::Boolean => "boolean",
            ToolParameterType::Array => "array",
            ToolParameterType::Object => "object",
        }
    }
}

/// One named parameter in a [`Tool`] schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: ToolParameterType,
    pub description: String,
    pub required: bool,
}

impl ToolParameter {
    /// Define a parameter; optional unless [`required`](ToolParameter::required)
    /// is called.
    pub fn new(
        name: impl Into<String>,
        param_type: ToolParameterType,
        description: impl Into<String>,
    ) -> Self {
        ToolParameter {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
        }
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Schema for one tool the model is allowed to call.
///
/// The wire form differs per provider (OpenAI-style `function` objects vs.
/// Anthropic `input_schema` objects) and is produced by the request encoder;
/// this struct only holds the provider-neutral declaration. Parameter order
/// is preserved all the way to the emitted JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

/// Construct a [`Tool`] schema from an ordered parameter list.
///
/// The emitted `required` array preserves the declaration order of the
/// parameters flagged as required; the properties map is insertion-ordered.
pub fn build_tool(
    name: impl Into<String>,
    description: impl Into<String>,
    parameters: Vec<ToolParameter>,
) -> Tool {
    Tool {
        name: name.into(),
        description: description.into(),
        parameters,
    }
}

/// Policy telling the model whether and which tool it may pick next turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolChoice {
    /// The model must not call a tool.
    None,
    /// The model decides on its own.
    #[default]
    Auto,
    /// The model must call the named tool.
    Tool(String),
}

/// Token accounting echoed from the provider's usage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// One completion alternative in a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Unified completion response.
///
/// Chat-completions bodies decode into this directly; Anthropic Messages
/// bodies are converted (`object` takes the value of `type`, `created`
/// becomes 0, one choice per content block, usage totals summed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}
