//! The model-to-tools control loop.
//!
//! When an assistant message carries tool calls, [`handle_tool_calls`]
//! dispatches each call in order to its registered handler, appends the
//! results as tool messages, asks the model again, and repeats until the
//! model stops calling tools or the call budget runs out. The budget is a
//! hard bound on the number of model requests: when a single request
//! remains, the request is sent with the tool-choice policy forced to
//! `None` so the model cannot ask for more tools.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use palaver::tool_loop::{handle_tool_calls, ToolRegistry};
//! use palaver::tools::clock::ClockTool;
//! use palaver::transport::ReqwestTransport;
//! use palaver::{Client, Provider, ToolChoice};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), palaver::Error> {
//! let mut registry = ToolRegistry::new();
//! registry.register(ClockTool::schema(), Arc::new(ClockTool));
//!
//! let mut client = Client::new(Provider::OpenAI, "sk-...", "gpt-4o-mini")?
//!     .with_tools(registry.schemas().to_vec());
//! client.add_user("What time is it in UTC?", false);
//!
//! let transport = ReqwestTransport;
//! client.send(&transport, ToolChoice::Auto).await?;
//! handle_tool_calls(&mut client, &registry, &transport, 4).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;

use crate::palaver::client::Client;
use crate::palaver::error::Error;
use crate::palaver::transport::HttpTransport;
use crate::palaver::wire::{Message, Role, Tool, ToolCall, ToolChoice};

/// Content of the synthetic tool-result message appended when the model
/// requests a tool no handler is registered for.
pub const MISSING_TOOL_MESSAGE: &str =
    "Error: the requested tool could not be found on the host machine.";

/// A local function the model can call.
///
/// `arguments` is the raw JSON text produced by the model; handlers parse it
/// themselves. Recognised failure modes should be translated into
/// human-readable result strings; an `Err` is reserved for catastrophic
/// conditions and aborts the loop.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

/// Pairs each advertised [`Tool`] schema with its handler.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry::default()
    }

    /// Register a tool schema together with the handler that serves it.
    /// Re-registering a name replaces the previous handler.
    pub fn register(&mut self, tool: Tool, handler: Arc<dyn ToolHandler>) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == tool.name) {
            *existing = tool.clone();
        } else {
            self.tools.push(tool.clone());
        }
        self.handlers.insert(tool.name, handler);
    }

    /// The schemas to advertise on the client, in registration order.
    pub fn schemas(&self) -> &[Tool] {
        &self.tools
    }

    pub fn handler(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

/// Drive the model-to-tools loop until the model stops requesting tools or
/// `max_model_calls` requests have been issued.
///
/// Calls are dispatched strictly in the order they appear in the assistant
/// message, one at a time; a handler never observes a later handler's
/// effect. An unknown tool name produces a synthetic tool-result message
/// (see [`MISSING_TOOL_MESSAGE`]) rather than an error. A handler failure or
/// an HTTP failure aborts the loop with the error; tool-result messages
/// appended before the failure remain on the client.
pub async fn handle_tool_calls(
    client: &mut Client,
    registry: &ToolRegistry,
    transport: &dyn HttpTransport,
    max_model_calls: u32,
) -> Result<(), Error> {
    let mut budget = max_model_calls;
    loop {
        let calls: Vec<ToolCall> = match client.messages.last() {
            Some(message) if message.role == Role::Assistant && !message.tool_calls.is_empty() => {
                message.tool_calls.clone()
            }
            _ => return Ok(()),
        };
        if budget == 0 {
            return Ok(());
        }
        // With a single request left, forbid further tool calls so the
        // exchange is guaranteed to terminate.
        let tool_choice = if budget > 1 {
            ToolChoice::Auto
        } else {
            ToolChoice::None
        };

        for call in &calls {
            let name = &call.function.name;
            let content = match registry.handler(name) {
                Some(handler) => {
                    if log::log_enabled!(log::Level::Debug) {
                        log::debug!("dispatching tool '{}' (call {})", name, call.id);
                    }
                    handler
                        .call(&call.function.arguments)
                        .await
                        .map_err(|err| Error::Handler {
                            tool: name.clone(),
                            message: err.to_string(),
                        })?
                }
                None => {
                    log::warn!("model requested unknown tool '{}'", name);
                    MISSING_TOOL_MESSAGE.to_string()
                }
            };
            client
                .messages
                .push(Message::tool_result(&call.id, name, content));
        }

        client.send(transport, tool_choice).await?;
        budget -= 1;
    }
}
