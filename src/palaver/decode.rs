//! Response decoding for every provider dialect.
//!
//! One entry point, [`decode_response`], tries the known shapes in order:
//! the chat-completions shape (OpenAI, OpenRouter, OpenAI-compatible), the
//! Anthropic Messages shape, and finally the error-body shape. Whatever
//! arrives is normalised into the unified [`Response`] so callers never see
//! a provider-specific field name.

use serde::Deserialize;
use serde_json::Value;

use crate::palaver::error::Error;
use crate::palaver::wire::{Choice, FunctionCall, Message, Response, ToolCall, Usage};

/// Anthropic Messages response, converted into [`Response`] after decoding.
#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(rename = "type")]
    kind: String,
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Deserialize, Default)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    /// Tool arguments arrive as an open-key JSON object; carried through
    /// verbatim as the serialized arguments string.
    #[serde(default)]
    input: Option<Value>,
}

impl AnthropicResponse {
    fn into_response(self) -> Response {
        let usage = Usage {
            prompt_tokens: self.usage.input_tokens,
            completion_tokens: self.usage.output_tokens,
            total_tokens: self.usage.input_tokens + self.usage.output_tokens,
        };
        let stop_reason = self.stop_reason;
        let choices = self
            .content
            .into_iter()
            .enumerate()
            .map(|(index, block)| {
                let mut message = Message::assistant(block.text.unwrap_or_default(), false);
                if block.kind == "tool_use" {
                    let arguments = block
                        .input
                        .map(|input| input.to_string())
                        .unwrap_or_else(|| "{}".to_string());
                    message.tool_calls.push(ToolCall {
                        id: block.id.unwrap_or_default(),
                        kind: "function".to_string(),
                        function: FunctionCall {
                            name: block.name.unwrap_or_default(),
                            arguments,
                        },
                    });
                }
                Choice {
                    index: index as u32,
                    message,
                    finish_reason: stop_reason.clone(),
                }
            })
            .collect();
        Response {
            id: self.id,
            model: self.model,
            object: self.kind,
            created: 0,
            choices,
            usage,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Parse a response body from any supported provider into the unified shape.
///
/// Leading bytes at or below 0x20 are dropped before parsing. A body that
/// parses as the provider's error shape becomes [`Error::Api`]; a body that
/// parses as nothing known is surfaced raw in [`Error::BadJson`].
pub fn decode_response(bytes: &[u8]) -> Result<Response, Error> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| Error::Decode(format!("response body is not UTF-8: {}", err)))?;
    let trimmed = text.trim_start_matches(|c: char| c as u32 <= 0x20);

    if let Ok(response) = serde_json::from_str::<Response>(trimmed) {
        return Ok(response);
    }
    if let Ok(anthropic) = serde_json::from_str::<AnthropicResponse>(trimmed) {
        return Ok(anthropic.into_response());
    }
    if let Ok(body) = serde_json::from_str::<ErrorBody>(trimmed) {
        if log::log_enabled!(log::Level::Error) {
            log::error!("API error {}: {}", body.error.code, body.error.message);
        }
        return Err(Error::Api {
            code: body.error.code,
            message: body.error.message,
        });
    }
    Err(Error::BadJson(text.to_string()))
}

/// Decode a body and return choice 0's message.
pub fn decode_top_message_choice(bytes: &[u8]) -> Result<Message, Error> {
    let response = decode_response(bytes)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(Error::NoChoices)
}
