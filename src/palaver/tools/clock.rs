//! Current-time tool.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::error::Error as StdError;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::wire::{build_tool, Tool};

/// Reports the current UTC time as an RFC 3339 timestamp.
pub struct ClockTool;

impl ClockTool {
    pub fn schema() -> Tool {
        build_tool(
            "utc_now",
            "Get the current date and time in UTC, formatted as an RFC 3339 timestamp.",
            vec![],
        )
    }
}

#[async_trait]
impl ToolHandler for ClockTool {
    async fn call(&self, _arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        Ok(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}
