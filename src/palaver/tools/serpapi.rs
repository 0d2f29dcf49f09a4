//! Web search tool backed by SerpApi.
//!
//! Requires the `SERPAPI_API_KEY` environment variable.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::tools::get_env_var;
use crate::palaver::transport::get_shared_http_client;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

const SEARCH_URL: &str = "https://serpapi.com/search.json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: usize = 5;

/// Google web search through SerpApi.
pub struct WebSearchTool;

impl WebSearchTool {
    pub fn schema() -> Tool {
        build_tool(
            "web_search",
            "Search the web and return the top results with title, link, and snippet.",
            vec![ToolParameter::new(
                "query",
                ToolParameterType::String,
                "Search terms",
            )
            .required()],
        )
    }
}

#[async_trait]
impl ToolHandler for WebSearchTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let query = match parsed.get("query").and_then(|value| value.as_str()) {
            Some(query) if !query.is_empty() => query,
            _ => return Ok("Error: missing required parameter 'query'.".to_string()),
        };
        let api_key = match get_env_var("SERPAPI_API_KEY") {
            Ok(api_key) => api_key,
            Err(_) => return Ok("Error: SERPAPI_API_KEY is not set.".to_string()),
        };

        let url = format!(
            "{}?engine=google&q={}&api_key={}",
            SEARCH_URL,
            urlencoding::encode(query),
            urlencoding::encode(&api_key)
        );
        let response = get_shared_http_client()
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(format!(
                "Error: SerpApi returned HTTP {}.",
                response.status().as_u16()
            ));
        }
        let body: Value = response.json().await?;

        let results = body
            .get("organic_results")
            .and_then(|results| results.as_array());
        let results = match results {
            Some(results) if !results.is_empty() => results,
            _ => return Ok(format!("No web results for '{}'.", query)),
        };

        let mut lines = Vec::new();
        for result in results.iter().take(MAX_RESULTS) {
            let title = result
                .get("title")
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            let link = result
                .get("link")
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            let snippet = result
                .get("snippet")
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            lines.push(format!("{} ({})\n  {}", title, link, snippet));
        }
        Ok(lines.join("\n"))
    }
}
