//! Crate-wide error type.
//!
//! One enum covers the whole taxonomy: transport failures bubbled up from
//! the HTTP collaborator, non-2xx statuses, undecodable bodies, provider
//! error payloads, empty completions, and tool-handler failures. Nothing in
//! this crate retries; every variant surfaces verbatim so the caller can
//! decide what to do with the same client state it passed in.

use std::error::Error as StdError;
use std::fmt;

/// Everything that can go wrong while talking to a provider or dispatching
/// tool calls.
#[derive(Debug)]
pub enum Error {
    /// The HTTP collaborator failed before a response arrived.
    Transport(reqwest::Error),
    /// The provider answered with a status outside 200-299. The client's
    /// message history is left untouched.
    Http { status: u16, body: String },
    /// The body parsed as the provider's error shape.
    Api { code: i64, message: String },
    /// The response decoded but contained no choices.
    NoChoices,
    /// The body could not be parsed as any known shape; carries the raw text.
    BadJson(String),
    /// The body was not valid UTF-8, or a known shape failed mid-decode.
    Decode(String),
    /// A request body could not be serialized.
    Encode(String),
    /// The provider requires an API key and none was supplied.
    MissingApiKey,
    /// A tool handler returned an error; the loop aborts and any tool-result
    /// messages appended before the failure remain on the client.
    Handler { tool: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            Error::Api { code, message } => write!(f, "API error {}: {}", code, message),
            Error::NoChoices => write!(f, "response contained no choices"),
            Error::BadJson(raw) => write!(f, "response body is not valid JSON: {}", raw),
            Error::Decode(msg) => write!(f, "failed to decode response: {}", msg),
            Error::Encode(msg) => write!(f, "failed to encode request body: {}", msg),
            Error::MissingApiKey => write!(f, "an API key is required for this provider"),
            Error::Handler { tool, message } => write!(f, "tool '{}' failed: {}", tool, message),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}
