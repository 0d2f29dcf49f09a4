//! Conversation state and the provider it talks to.
//!
//! A [`Client`] is created once per conversation and mutated by builder
//! operations as the exchange progresses: the caller appends user messages,
//! [`Client::update_messages`] appends the decoded assistant reply, and the
//! tool-call loop appends tool results. Nothing here is shared between
//! threads; each conversation owns its client.
//!
//! # Example
//!
//! ```rust
//! use palaver::{Client, Provider};
//!
//! let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini")
//!     .expect("key present")
//!     .with_temperature(0.7)
//!     .with_max_tokens(1024);
//! client.add_user("Hello, computer!", false);
//! assert_eq!(client.messages.len(), 1);
//! ```

use std::time::Duration;

use crate::palaver::decode::decode_response;
use crate::palaver::error::Error;
use crate::palaver::transport::{HttpResponse, HttpTransport};
use crate::palaver::wire::{Message, Tool, ToolChoice, Usage};

/// An HTTP endpoint family the client knows how to talk to.
///
/// A closed set, dispatched by `match`. The wire differences between
/// providers are local enough that polymorphic provider objects would only
/// obscure them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `https://api.openai.com/v1/chat/completions`, bearer auth.
    OpenAI,
    /// `https://api.anthropic.com/v1/messages`, `x-api-key` auth plus a
    /// pinned `anthropic-version`. The system prompt lives outside the
    /// messages array.
    Anthropic,
    /// `https://openrouter.ai/api/v1/chat/completions`, bearer auth, with
    /// routing extras (provider order, fallback route, alternate models)
    /// and the extended sampling knobs.
    OpenRouter,
    /// Any endpoint accepting the OpenAI body shape. An empty API key is
    /// allowed here, for local servers that ignore auth.
    OpenAICompliant { url: String },
}

/// OpenRouter routing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Select another equivalently-priced model when the primary fails.
    Fallback,
}

/// One conversation with one provider.
///
/// Sampling parameters carry the provider defaults; optional request fields
/// are omitted from the wire entirely while unset (`None`, empty string,
/// empty list). Message order equals insertion order and is never reordered
/// by the request assembler.
#[derive(Debug, Clone)]
pub struct Client {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    /// Client-side bound on each HTTP request; `None` means no bound.
    pub timeout: Option<Duration>,

    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub repetition_penalty: f32,
    pub min_p: f32,
    pub top_a: f32,

    pub seed: Option<u64>,
    pub max_tokens: Option<u32>,
    /// OpenRouter only: upstream providers to try, in order.
    pub provider_order: Vec<String>,
    /// OpenRouter only: alternate model list.
    pub models: Vec<String>,
    /// OpenRouter only: routing mode.
    pub route: Option<Route>,
    pub tools: Vec<Tool>,
    /// System prompt. On Anthropic this is sent as the top-level `system`
    /// field; elsewhere system content travels as ordinary messages.
    pub system: String,
    /// Ask the provider for a streamed response. Request shaping only; this
    /// crate always consumes complete JSON bodies.
    pub stream: bool,

    pub messages: Vec<Message>,
    /// Usage block echoed from the most recent decoded response.
    pub last_usage: Option<Usage>,
}

impl Client {
    /// Create a client with default sampling parameters.
    ///
    /// Fails with [`Error::MissingApiKey`] when `api_key` is empty, unless
    /// the provider is [`Provider::OpenAICompliant`].
    pub fn new(
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.is_empty() && !matches!(provider, Provider::OpenAICompliant { .. }) {
            return Err(Error::MissingApiKey);
        }
        Ok(Client {
            provider,
            api_key,
            model: model.into(),
            timeout: None,
            temperature: 1.0,
            top_p: 1.0,
            top_k: 0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            repetition_penalty: 1.0,
            min_p: 0.0,
            top_a: 0.0,
            seed: None,
            max_tokens: None,
            provider_order: Vec::new(),
            models: Vec::new(),
            route: None,
            tools: Vec::new(),
            system: String::new(),
            stream: false,
            messages: Vec::new(),
            last_usage: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = penalty;
        self
    }

    pub fn with_min_p(mut self, min_p: f32) -> Self {
        self.min_p = min_p;
        self
    }

    pub fn with_top_a(mut self, top_a: f32) -> Self {
        self.top_a = top_a;
        self
    }

    /// A seed of 0 leaves the field unset.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = if seed == 0 { None } else { Some(seed) };
        self
    }

    /// A limit of 0 leaves the field unset.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = if max_tokens == 0 { None } else { Some(max_tokens) };
        self
    }

    pub fn with_provider_order(mut self, order: Vec<String>) -> Self {
        self.provider_order = order;
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn with_fallback_route(mut self) -> Self {
        self.route = Some(Route::Fallback);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Append a system message.
    ///
    /// On Anthropic the request assembler later folds system messages into
    /// the top-level `system` field and strips them from the messages array;
    /// elsewhere they travel as ordinary messages.
    pub fn add_system(&mut self, text: impl Into<String>, cached: bool) {
        self.messages.push(Message::system(text, cached));
    }

    /// Append a user message.
    pub fn add_user(&mut self, text: impl Into<String>, cached: bool) {
        self.messages.push(Message::user(text, cached));
    }

    /// Append an assistant message.
    pub fn add_assistant(&mut self, text: impl Into<String>, cached: bool) {
        self.messages.push(Message::assistant(text, cached));
    }

    /// Decode a provider response and append its top assistant message.
    ///
    /// A status outside 200-299 returns [`Error::Http`] and leaves the
    /// client untouched, as does any decode failure. On success the usage
    /// block is echoed into [`Client::last_usage`].
    pub fn update_messages(&mut self, response: &HttpResponse) -> Result<(), Error> {
        if !(200..300).contains(&response.status) {
            return Err(Error::Http {
                status: response.status,
                body: response.body_text(),
            });
        }
        let decoded = decode_response(&response.body)?;
        let usage = decoded.usage;
        let message = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(Error::NoChoices)?
            .message;
        self.last_usage = Some(usage);
        self.messages.push(message);
        Ok(())
    }

    /// One full turn: assemble the request, perform it through `transport`,
    /// decode, and append the assistant reply.
    pub async fn send(
        &mut self,
        transport: &dyn HttpTransport,
        tool_choice: ToolChoice,
    ) -> Result<(), Error> {
        let request = self.build_http_request(tool_choice)?;
        let response = transport.send(&request).await?;
        self.update_messages(&response)
    }
}
