//! Provider request assembly.
//!
//! [`Client::build_http_request`] turns the client's state into a fully
//! materialised [`RequestDescription`]: URL and auth headers per provider, a
//! base body with that provider's restricted field set, the encoded message
//! array, and (when tools are configured) the tools array and tool-choice
//! policy. Optional fields are omitted when absent, never sent as `null`;
//! some providers reject explicit nulls for numeric fields.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::palaver::client::{Client, Provider, Route};
use crate::palaver::encode::{encode_messages, encode_tool_choice, encode_tools};
use crate::palaver::error::Error;
use crate::palaver::transport::RequestDescription;
use crate::palaver::wire::{Role, ToolChoice};

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// OpenAI base body; also used verbatim for OpenAI-compatible endpoints.
#[derive(Serialize)]
struct OpenAiBody<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    stream: bool,
}

#[derive(Serialize)]
struct AnthropicBody<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    stream: bool,
}

#[derive(Serialize)]
struct ProviderPreferences<'a> {
    order: &'a [String],
}

/// OpenRouter: the OpenAI fields plus the extended sampling knobs and
/// routing extras.
#[derive(Serialize)]
struct OpenRouterBody<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    top_a: f32,
    top_k: u32,
    repetition_penalty: f32,
    min_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<ProviderPreferences<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    models: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<&'static str>,
    #[serde(skip_serializing_if = "is_false")]
    stream: bool,
}

impl Provider {
    /// The endpoint URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        match self {
            Provider::OpenAI => OPENAI_URL,
            Provider::Anthropic => ANTHROPIC_URL,
            Provider::OpenRouter => OPENROUTER_URL,
            Provider::OpenAICompliant { url } => url,
        }
    }
}

impl Client {
    /// Assemble the wire request for the current conversation state.
    ///
    /// On Anthropic this first folds any system-role messages into the
    /// client's `system` field (skipping content already contained in it)
    /// and strips them from the request's message array; the folded prompt
    /// persists on the client.
    ///
    /// `tool_choice` is only emitted when the client has tools configured.
    pub fn build_http_request(
        &mut self,
        tool_choice: ToolChoice,
    ) -> Result<RequestDescription, Error> {
        let anthropic = self.provider == Provider::Anthropic;
        if anthropic {
            self.fold_system_messages();
        }
        let messages = encode_messages(&self.messages, &self.provider, anthropic);

        let mut body = match &self.provider {
            Provider::OpenAI | Provider::OpenAICompliant { .. } => to_object(&OpenAiBody {
                model: &self.model,
                messages,
                temperature: self.temperature,
                top_p: self.top_p,
                frequency_penalty: self.frequency_penalty,
                presence_penalty: self.presence_penalty,
                seed: self.seed,
                max_completion_tokens: self.max_tokens,
                stream: self.stream,
            })?,
            Provider::Anthropic => to_object(&AnthropicBody {
                model: &self.model,
                messages,
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
                seed: self.seed,
                max_tokens: self.max_tokens,
                system: if self.system.is_empty() {
                    None
                } else {
                    Some(&self.system)
                },
                stream: self.stream,
            })?,
            Provider::OpenRouter => to_object(&OpenRouterBody {
                model: &self.model,
                messages,
                temperature: self.temperature,
                top_p: self.top_p,
                frequency_penalty: self.frequency_penalty,
                presence_penalty: self.presence_penalty,
                top_a: self.top_a,
                top_k: self.top_k,
                repetition_penalty: self.repetition_penalty,
                min_p: self.min_p,
                seed: self.seed,
                max_completion_tokens: self.max_tokens,
                provider: if self.provider_order.is_empty() {
                    None
                } else {
                    Some(ProviderPreferences {
                        order: &self.provider_order,
                    })
                },
                models: if self.models.is_empty() {
                    None
                } else {
                    Some(&self.models)
                },
                route: self.route.map(|route| match route {
                    Route::Fallback => "fallback",
                }),
                stream: self.stream,
            })?,
        };

        if !self.tools.is_empty() {
            body.insert("tools".to_string(), encode_tools(&self.tools, &self.provider));
            if let Some(choice) = encode_tool_choice(&tool_choice, &self.provider) {
                body.insert("tool_choice".to_string(), choice);
            }
        }

        let headers = match &self.provider {
            Provider::Anthropic => vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("x-api-key".to_string(), self.api_key.clone()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            _ => vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.api_key),
                ),
            ],
        };

        let url = self.provider.endpoint().to_string();
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "building request for model '{}' at {} ({} messages)",
                self.model,
                url,
                self.messages.len()
            );
        }

        let body = serde_json::to_vec(&Value::Object(body))
            .map_err(|err| Error::Encode(err.to_string()))?;

        Ok(RequestDescription {
            method: reqwest::Method::POST,
            url,
            headers,
            body,
            timeout: self.timeout,
        })
    }

    /// Fold system-role messages into `system`, joined with `"\n"`, skipping
    /// content that is already a substring of the prompt. The messages stay
    /// on the client; they are only stripped from the encoded request.
    fn fold_system_messages(&mut self) {
        for index in 0..self.messages.len() {
            if self.messages[index].role != Role::System {
                continue;
            }
            let content = &self.messages[index].content;
            if self.system.contains(content.as_str()) {
                continue;
            }
            let mut system = std::mem::take(&mut self.system);
            if !system.is_empty() {
                system.push('\n');
            }
            system.push_str(content);
            self.system = system;
        }
    }
}

fn to_object<T: Serialize>(body: &T) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(body).map_err(|err| Error::Encode(err.to_string()))? {
        Value::Object(object) => Ok(object),
        other => Err(Error::Encode(format!(
            "request body serialized to a non-object: {}",
            other
        ))),
    }
}
