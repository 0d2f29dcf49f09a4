use std::env;
use std::io::{self, Write};

use palaver::transport::ReqwestTransport;
use palaver::{Client, Provider, ToolChoice};

#[tokio::main]
async fn main() {
    env_logger::init();

    let secret_key =
        env::var("OPENAI_API_KEY").expect("Please set the OPENAI_API_KEY environment variable!");

    let mut client =
        Client::new(Provider::OpenAI, &secret_key, "gpt-4o-mini").expect("API key is present");
    client.add_system("You are a concise, helpful assistant.", false);

    let transport = ReqwestTransport;

    loop {
        print!("You: ");
        io::stdout().flush().unwrap();

        let mut user_input = String::new();
        io::stdin()
            .read_line(&mut user_input)
            .expect("Failed to read line");
        let user_input = user_input.trim();
        if user_input.is_empty() || user_input == "exit" {
            break;
        }

        client.add_user(user_input, false);
        match client.send(&transport, ToolChoice::Auto).await {
            Ok(()) => {
                if let Some(reply) = client.messages.last() {
                    println!("Assistant: {}", reply.content);
                }
                if let Some(usage) = &client.last_usage {
                    println!("  ({} tokens)", usage.total_tokens);
                }
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }
}
