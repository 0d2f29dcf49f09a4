//! Built-in tools.
//!
//! Each tool is a pair: a schema (via an associated `schema()` constructor)
//! and a [`ToolHandler`](crate::tool_loop::ToolHandler) implementation. The
//! core dispatches to them through the same handler contract it applies to
//! caller-supplied tools; nothing here is special-cased.
//!
//! # Available tools
//!
//! - **Clock**: current UTC time.
//! - **Calculator**: mathematical expression evaluation.
//! - **File system**: sandboxed read, write, and list operations under a
//!   fixed root directory.
//! - **Wikipedia**: article search against the MediaWiki API.
//! - **Weather**: city lookup plus current conditions via Open-Meteo.
//! - **WolframAlpha**: short-answer queries (`WOLFRAMALPHA_APP_ID`).
//! - **Web search**: Google results via SerpApi (`SERPAPI_API_KEY`).
//!
//! The HTTP-backed tools share the crate's pooled HTTP client and translate
//! recognised failures (missing key, non-2xx status, empty results) into
//! readable result strings instead of errors, so the model can react to
//! them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use palaver::tool_loop::ToolRegistry;
//! use palaver::tools::{calculator::CalculatorTool, clock::ClockTool};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(ClockTool::schema(), Arc::new(ClockTool));
//! registry.register(CalculatorTool::schema(), Arc::new(CalculatorTool));
//! ```

pub mod calculator;
pub mod clock;
pub mod filesystem;
pub mod serpapi;
pub mod weather;
pub mod wikipedia;
pub mod wolfram;

pub use calculator::CalculatorTool;
pub use clock::ClockTool;
pub use filesystem::{FileSystemError, FileSystemTool};
pub use serpapi::WebSearchTool;
pub use weather::WeatherTool;
pub use wikipedia::WikipediaTool;
pub use wolfram::WolframTool;

/// Environment access used by the built-in tools, kept behind one seam.
pub fn get_env_var(name: &str) -> Result<String, std::env::VarError> {
    std::env::var(name)
}
