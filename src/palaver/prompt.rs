//! Llama-style prompt-tag helpers and the raw-completion request path.
//!
//! Local OpenAI-compatible servers frequently expose a plain completion
//! endpoint alongside chat completions. The helpers here fold a
//! conversation into the `[INST]`/`<<SYS>>` tag format those models were
//! tuned on, and build the corresponding raw request body. None of this is
//! part of the chat/tool-calling core.

use serde::Serialize;

use crate::palaver::client::Client;
use crate::palaver::error::Error;
use crate::palaver::transport::RequestDescription;
use crate::palaver::wire::{Message, Role};

const INST_OPEN: &str = "[INST]";
const INST_CLOSE: &str = "[/INST]";
const SYS_OPEN: &str = "<<SYS>>";
const SYS_CLOSE: &str = "<</SYS>>";

/// Wrap a single user prompt, optionally preceded by a system prompt, in
/// Llama instruction tags.
pub fn format_prompt(system: &str, prompt: &str) -> String {
    if system.is_empty() {
        format!("{} {} {}", INST_OPEN, prompt, INST_CLOSE)
    } else {
        format!(
            "{} {}\n{}\n{} {} {}",
            INST_OPEN, SYS_OPEN, system, SYS_CLOSE, prompt, INST_CLOSE
        )
    }
}

/// Fold a message history into one tagged prompt string.
///
/// System messages become `<<SYS>>` blocks inside the following instruction,
/// user messages become `[INST]` blocks, and assistant messages are appended
/// verbatim between instructions. Tool messages have no tag form and are
/// skipped.
pub fn format_messages(system: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    let mut pending_system = system.to_string();
    for message in messages {
        match message.role {
            Role::System => {
                if !pending_system.is_empty() {
                    pending_system.push('\n');
                }
                pending_system.push_str(&message.content);
            }
            Role::User => {
                let block = format_prompt(&pending_system, &message.content);
                pending_system.clear();
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&block);
            }
            Role::Assistant => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&message.content);
            }
            Role::Tool => {}
        }
    }
    out
}

#[derive(Serialize)]
struct RawCompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Build a raw completion request for the client's endpoint.
///
/// The prompt is sent as-is; combine with [`format_messages`] to drive a
/// tag-formatted model. Auth headers follow the client's provider.
pub fn build_raw_completion_request(
    client: &Client,
    prompt: &str,
) -> Result<RequestDescription, Error> {
    let body = serde_json::to_vec(&RawCompletionBody {
        model: &client.model,
        prompt,
        temperature: client.temperature,
        top_p: client.top_p,
        seed: client.seed,
        max_tokens: client.max_tokens,
    })
    .map_err(|err| Error::Encode(err.to_string()))?;

    Ok(RequestDescription {
        method: reqwest::Method::POST,
        url: client.provider.endpoint().to_string(),
        headers: vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", client.api_key),
            ),
        ],
        body,
        timeout: client.timeout,
    })
}

/// Extract the completion text from a raw completion response body.
pub fn decode_raw_completion(bytes: &[u8]) -> Result<String, Error> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| Error::Decode(format!("response body is not UTF-8: {}", err)))?;
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Err(Error::BadJson(text.to_string())),
    };
    value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("text"))
        .and_then(|content| content.as_str())
        .map(|content| content.to_string())
        .ok_or(Error::NoChoices)
}
