use std::env;
use std::sync::Arc;

use palaver::tool_loop::{handle_tool_calls, ToolRegistry};
use palaver::tools::{CalculatorTool, ClockTool, WeatherTool};
use palaver::transport::ReqwestTransport;
use palaver::{Client, Provider, ToolChoice};

#[tokio::main]
async fn main() {
    env_logger::init();

    let secret_key =
        env::var("OPENAI_API_KEY").expect("Please set the OPENAI_API_KEY environment variable!");

    let mut registry = ToolRegistry::new();
    registry.register(ClockTool::schema(), Arc::new(ClockTool));
    registry.register(CalculatorTool::schema(), Arc::new(CalculatorTool));
    registry.register(WeatherTool::schema(), Arc::new(WeatherTool));

    let mut client = Client::new(Provider::OpenAI, &secret_key, "gpt-4o-mini")
        .expect("API key is present")
        .with_tools(registry.schemas().to_vec());
    client.add_system(
        "You are a helpful assistant. Use the available tools when they help.",
        false,
    );

    let question = env::args()
        .nth(1)
        .unwrap_or_else(|| "What is the weather in Amsterdam right now, and what time is it in UTC?".to_string());
    println!("You: {}", question);
    client.add_user(&question, false);

    let transport = ReqwestTransport;
    client
        .send(&transport, ToolChoice::Auto)
        .await
        .expect("initial request failed");
    handle_tool_calls(&mut client, &registry, &transport, 8)
        .await
        .expect("tool loop failed");

    if let Some(reply) = client.messages.last() {
        println!("Assistant: {}", reply.content);
    }
}
