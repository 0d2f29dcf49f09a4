use palaver::prompt::{
    build_raw_completion_request, decode_raw_completion, format_messages, format_prompt,
};
use palaver::{Client, Error, Message, Provider};

#[test]
fn formats_prompt_without_system() {
    assert_eq!(format_prompt("", "hi"), "[INST] hi [/INST]");
}

#[test]
fn formats_prompt_with_system_block() {
    let formatted = format_prompt("be brief", "hi");
    assert_eq!(
        formatted,
        "[INST] <<SYS>>\nbe brief\n<</SYS>> hi [/INST]"
    );
}

#[test]
fn folds_history_into_tagged_prompt() {
    let messages = vec![
        Message::system("be brief", false),
        Message::user("question one", false),
        Message::assistant("answer one", false),
        Message::tool_result("call_1", "echo", "ignored"),
        Message::user("question two", false),
    ];
    let formatted = format_messages("", &messages);
    assert_eq!(
        formatted,
        "[INST] <<SYS>>\nbe brief\n<</SYS>> question one [/INST]\n\
         answer one\n\
         [INST] question two [/INST]"
    );
}

#[test]
fn raw_completion_request_carries_prompt() {
    let client = Client::new(
        Provider::OpenAICompliant {
            url: "http://localhost:8080/completion".to_string(),
        },
        "",
        "llama3",
    )
    .unwrap();
    let request = build_raw_completion_request(&client, "[INST] hi [/INST]").unwrap();
    assert_eq!(request.url, "http://localhost:8080/completion");

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["model"], "llama3");
    assert_eq!(body["prompt"], "[INST] hi [/INST]");
    assert!(body.get("seed").is_none());
    assert!(body.get("max_tokens").is_none());
}

#[test]
fn decodes_raw_completion_text() {
    let body = br#"{"choices":[{"text":"hello"}]}"#;
    assert_eq!(decode_raw_completion(body).unwrap(), "hello");
}

#[test]
fn raw_completion_without_choices_is_no_choices() {
    let body = br#"{"choices":[]}"#;
    assert!(matches!(
        decode_raw_completion(body),
        Err(Error::NoChoices)
    ));
}

#[test]
fn raw_completion_garbage_is_bad_json() {
    assert!(matches!(
        decode_raw_completion(b"nope"),
        Err(Error::BadJson(_))
    ));
}
