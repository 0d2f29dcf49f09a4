//! Calculator tool.
//!
//! Evaluates arithmetic and scientific expressions with [`evalexpr`]:
//! standard operators (`+ - * / % ^`), the `math::` function namespace
//! (`math::sin`, `math::sqrt`, `math::ln`, ...), and boolean expressions.
//! Stateless; every call evaluates one expression in a fresh context.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

/// Evaluates one mathematical expression per call.
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn schema() -> Tool {
        build_tool(
            "calculator",
            "Evaluate a mathematical expression and return the numeric result. \
             Supports +, -, *, /, %, ^ and functions like math::sqrt, math::sin, math::ln.",
            vec![ToolParameter::new(
                "expression",
                ToolParameterType::String,
                "The expression to evaluate, e.g. \"2 + 2 * 3\" or \"math::sqrt(16)\"",
            )
            .required()],
        )
    }

    /// Evaluate an expression to a result string.
    pub fn evaluate(expression: &str) -> Result<String, String> {
        match evalexpr::eval(expression.trim()) {
            Ok(value) => match value {
                evalexpr::Value::Boolean(flag) => Ok(flag.to_string()),
                evalexpr::Value::String(text) => Ok(text),
                other => match other.as_number() {
                    Ok(number) => Ok(format_number(number)),
                    Err(_) => Err(format!("result is not a number: {:?}", other)),
                },
            },
            Err(err) => Err(format!("evaluation error: {}", err)),
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

#[async_trait]
impl ToolHandler for CalculatorTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let expression = match parsed.get("expression").and_then(|value| value.as_str()) {
            Some(expression) => expression,
            None => return Ok("Error: missing required parameter 'expression'.".to_string()),
        };
        match CalculatorTool::evaluate(expression) {
            Ok(result) => Ok(result),
            Err(message) => Ok(format!("Error: {}", message)),
        }
    }
}
