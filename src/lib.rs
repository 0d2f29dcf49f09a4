// src/lib.rs

pub mod palaver;

// Flatten the module hierarchy at the crate root so callers can write
// `palaver::wire::Message` instead of `palaver::palaver::wire::Message`.
pub use palaver::{client, decode, error, prompt, request, tool_loop, tools, transport, wire};

// Re-exporting the headline types for direct access.
pub use palaver::client::{Client, Provider, Route};
pub use palaver::decode::{decode_response, decode_top_message_choice};
pub use palaver::error::Error;
pub use palaver::tool_loop::{handle_tool_calls, ToolHandler, ToolRegistry};
pub use palaver::wire::{
    build_tool, Message, Response, Role, Tool, ToolCall, ToolChoice, ToolParameter,
    ToolParameterType, Usage,
};
