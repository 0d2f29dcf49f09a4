//! Wikipedia search tool.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::transport::get_shared_http_client;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

const SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Searches English Wikipedia through the MediaWiki API.
pub struct WikipediaTool;

impl WikipediaTool {
    pub fn schema() -> Tool {
        build_tool(
            "wikipedia_search",
            "Search Wikipedia and return the top matching article titles with a short snippet each.",
            vec![
                ToolParameter::new("query", ToolParameterType::String, "Search terms").required(),
                ToolParameter::new(
                    "limit",
                    ToolParameterType::Integer,
                    "Maximum number of results (default 5)",
                ),
            ],
        )
    }
}

/// Drop `<span>`-style markup MediaWiki embeds in search snippets.
fn strip_tags(snippet: &str) -> String {
    let mut out = String::with_capacity(snippet.len());
    let mut in_tag = false;
    for c in snippet.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[async_trait]
impl ToolHandler for WikipediaTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let query = match parsed.get("query").and_then(|value| value.as_str()) {
            Some(query) if !query.is_empty() => query,
            _ => return Ok("Error: missing required parameter 'query'.".to_string()),
        };
        let limit = parsed
            .get("limit")
            .and_then(|value| value.as_u64())
            .unwrap_or(5)
            .clamp(1, 50);

        let url = format!(
            "{}?action=query&list=search&format=json&utf8=1&srlimit={}&srsearch={}",
            SEARCH_URL,
            limit,
            urlencoding::encode(query)
        );
        let response = get_shared_http_client()
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(format!(
                "Error: Wikipedia returned HTTP {}.",
                response.status().as_u16()
            ));
        }
        let body: Value = response.json().await?;

        let results = body
            .get("query")
            .and_then(|query| query.get("search"))
            .and_then(|search| search.as_array());
        let results = match results {
            Some(results) if !results.is_empty() => results,
            _ => return Ok(format!("No Wikipedia results for '{}'.", query)),
        };

        let mut lines = Vec::new();
        for result in results {
            let title = result
                .get("title")
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            let snippet = result
                .get("snippet")
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            lines.push(format!("{}: {}", title, strip_tags(snippet)));
        }
        Ok(lines.join("\n"))
    }
}
