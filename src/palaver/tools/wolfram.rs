//! WolframAlpha short-answers tool.
//!
//! Requires the `WOLFRAMALPHA_APP_ID` environment variable.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::tools::get_env_var;
use crate::palaver::transport::get_shared_http_client;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

const RESULT_URL: &str = "https://api.wolframalpha.com/v1/result";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Asks WolframAlpha for a single short plain-text answer.
pub struct WolframTool;

impl WolframTool {
    pub fn schema() -> Tool {
        build_tool(
            "wolfram_alpha",
            "Ask WolframAlpha a factual or computational question and get a short plain-text answer.",
            vec![ToolParameter::new(
                "query",
                ToolParameterType::String,
                "The question, e.g. \"distance from Earth to Mars\"",
            )
            .required()],
        )
    }
}

#[async_trait]
impl ToolHandler for WolframTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let query = match parsed.get("query").and_then(|value| value.as_str()) {
            Some(query) if !query.is_empty() => query,
            _ => return Ok("Error: missing required parameter 'query'.".to_string()),
        };
        let app_id = match get_env_var("WOLFRAMALPHA_APP_ID") {
            Ok(app_id) => app_id,
            Err(_) => return Ok("Error: WOLFRAMALPHA_APP_ID is not set.".to_string()),
        };

        let url = format!(
            "{}?appid={}&i={}",
            RESULT_URL,
            urlencoding::encode(&app_id),
            urlencoding::encode(query)
        );
        let response = get_shared_http_client()
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        match status {
            200 => Ok(body),
            // The short-answers API uses 501 for "no short answer available".
            501 => Ok(format!("WolframAlpha has no short answer for '{}'.", query)),
            _ => Ok(format!("Error: WolframAlpha returned HTTP {}.", status)),
        }
    }
}
