use palaver::transport::HttpResponse;
use palaver::{Client, Error, Provider, Role};

fn openai_body(content: &str) -> Vec<u8> {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1700000000u64,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
    })
    .to_string()
    .into_bytes()
}

#[test]
fn new_requires_api_key() {
    let result = Client::new(Provider::OpenAI, "", "gpt-4o-mini");
    assert!(matches!(result, Err(Error::MissingApiKey)));
}

#[test]
fn compliant_endpoint_allows_empty_key() {
    let client = Client::new(
        Provider::OpenAICompliant {
            url: "http://localhost:8080/v1/chat/completions".to_string(),
        },
        "",
        "local-model",
    );
    assert!(client.is_ok());
}

#[test]
fn new_applies_default_sampling_parameters() {
    let client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    assert_eq!(client.temperature, 1.0);
    assert_eq!(client.top_p, 1.0);
    assert_eq!(client.top_k, 0);
    assert_eq!(client.frequency_penalty, 0.0);
    assert_eq!(client.presence_penalty, 0.0);
    assert_eq!(client.repetition_penalty, 1.0);
    assert_eq!(client.min_p, 0.0);
    assert_eq!(client.top_a, 0.0);
    assert!(client.seed.is_none());
    assert!(client.max_tokens.is_none());
    assert!(client.messages.is_empty());
    assert!(client.tools.is_empty());
    assert!(!client.stream);
}

#[test]
fn zero_sentinels_leave_optionals_unset() {
    let client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini")
        .unwrap()
        .with_seed(0)
        .with_max_tokens(0);
    assert!(client.seed.is_none());
    assert!(client.max_tokens.is_none());

    let client = client.with_seed(42).with_max_tokens(100);
    assert_eq!(client.seed, Some(42));
    assert_eq!(client.max_tokens, Some(100));
}

#[test]
fn messages_append_in_insertion_order() {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    client.add_system("be brief", false);
    client.add_user("one", false);
    client.add_assistant("two", false);
    client.add_user("three", false);

    let roles: Vec<Role> = client.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(client.messages[1].content, "one");
    assert_eq!(client.messages[3].content, "three");
}

#[test]
fn update_messages_rejects_http_error_without_mutation() {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    client.add_user("hi", false);

    let response = HttpResponse {
        status: 500,
        headers: vec![],
        body: b"down".to_vec(),
    };
    match client.update_messages(&response) {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "down");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    assert_eq!(client.messages.len(), 1);
    assert!(client.last_usage.is_none());
}

#[test]
fn update_messages_appends_top_choice_and_echoes_usage() {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    client.add_user("hi", false);

    let response = HttpResponse {
        status: 200,
        headers: vec![],
        body: openai_body("hello there"),
    };
    client.update_messages(&response).unwrap();

    assert_eq!(client.messages.len(), 2);
    let reply = client.messages.last().unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "hello there");

    let usage = client.last_usage.unwrap();
    assert_eq!(usage.prompt_tokens, 12);
    assert_eq!(usage.completion_tokens, 3);
    assert_eq!(usage.total_tokens, 15);
}

#[test]
fn update_messages_matches_decode_top_message_choice() {
    let body = openai_body("same message");

    let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    let response = HttpResponse {
        status: 200,
        headers: vec![],
        body: body.clone(),
    };
    client.update_messages(&response).unwrap();

    let decoded = palaver::decode_top_message_choice(&body).unwrap();
    assert_eq!(client.messages.last().unwrap(), &decoded);
}

#[test]
fn update_messages_surfaces_empty_choices() {
    let mut client = Client::new(Provider::OpenAI, "sk-X", "gpt-4o-mini").unwrap();
    let body = serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 0,
        "model": "gpt-4o-mini",
        "choices": [],
        "usage": { "prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0 }
    })
    .to_string()
    .into_bytes();
    let response = HttpResponse {
        status: 200,
        headers: vec![],
        body,
    };
    assert!(matches!(
        client.update_messages(&response),
        Err(Error::NoChoices)
    ));
    assert!(client.messages.is_empty());
}
