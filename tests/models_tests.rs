//! Data model unit tests

use cacheai::models::*;
use cacheai::ErrorKind;
use serde_json::json;

fn base_body() -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hello"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 4, "completion_tokens": 1, "total_tokens": 5}
    })
}

fn parse(value: &serde_json::Value) -> cacheai::CacheAIResult<ChatCompletion> {
    parse_completion(value.to_string().as_bytes())
}

#[test]
fn test_unknown_fields_are_ignored() {
    let mut body = base_body();
    body["cache_hit"] = json!(true);
    body["similarity"] = json!(0.97);
    body["choices"][0]["logprobs"] = json!(null);
    body["choices"][0]["message"]["refusal"] = json!(null);
    body["usage"]["prompt_tokens_details"] = json!({"cached_tokens": 0});

    let completion = parse(&body).unwrap();
    assert_eq!(completion.content(), Some("Hello"));
}

#[test]
fn test_object_defaults_when_absent() {
    let mut body = base_body();
    body.as_object_mut().unwrap().remove("object");

    let completion = parse(&body).unwrap();
    assert_eq!(completion.object, "chat.completion");
}

#[test]
fn test_required_fields_missing() {
    for field in ["id", "created", "model", "choices", "usage"] {
        let mut body = base_body();
        body.as_object_mut().unwrap().remove(field);
        let err = parse(&body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization, "missing {}", field);
    }
}

#[test]
fn test_non_numeric_usage_rejected() {
    let mut body = base_body();
    body["usage"]["prompt_tokens"] = json!("four");
    assert_eq!(parse(&body).unwrap_err().kind(), ErrorKind::Deserialization);

    let mut body = base_body();
    body["usage"]["completion_tokens"] = json!(-1);
    assert_eq!(parse(&body).unwrap_err().kind(), ErrorKind::Deserialization);
}

#[test]
fn test_unknown_role_rejected() {
    let mut body = base_body();
    body["choices"][0]["message"]["role"] = json!("wizard");
    assert_eq!(parse(&body).unwrap_err().kind(), ErrorKind::Deserialization);
}

#[test]
fn test_duplicate_choice_index_rejected() {
    let mut body = base_body();
    let choice = body["choices"][0].clone();
    body["choices"] = json!([choice.clone(), choice]);
    body["usage"] = json!({"prompt_tokens": 4, "completion_tokens": 2, "total_tokens": 6});

    assert_eq!(parse(&body).unwrap_err().kind(), ErrorKind::Deserialization);
}

#[test]
fn test_multiple_choices_preserve_order() {
    let mut body = base_body();
    body["choices"] = json!([
        {"index": 0, "message": {"role": "assistant", "content": "a"}, "finish_reason": "stop"},
        {"index": 1, "message": {"role": "assistant", "content": "b"}, "finish_reason": "content_filter"}
    ]);

    let completion = parse(&body).unwrap();
    assert_eq!(completion.choices.len(), 2);
    assert_eq!(completion.choices[1].message.content, "b");
    assert_eq!(completion.choices[1].finish_reason, FinishReason::ContentFilter);
}

#[test]
fn test_invalid_json_body_keeps_raw_text() {
    let err = parse_completion(b"<html>oops</html>").unwrap_err();
    match err {
        cacheai::CacheAIError::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("Expected deserialization error, got {:?}", other),
    }
}

#[test]
fn test_request_omits_unset_params() {
    let request = ChatCompletionRequest::new(
        "gpt-3.5-turbo",
        vec![ChatMessage::user("Hello!")],
        GenerationParams::default(),
    );

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({"model": "gpt-3.5-turbo", "messages": [{"role": "user", "content": "Hello!"}]})
    );
}

#[test]
fn test_request_deserializes_flattened_params() {
    let request: ChatCompletionRequest = serde_json::from_value(json!({
        "model": "gpt-4o",
        "messages": [{"role": "user", "content": "hi"}],
        "n": 2,
        "seed": 7,
        "user": "u-1"
    }))
    .unwrap();

    assert_eq!(request.params.n, Some(2));
    assert_eq!(request.params.seed, Some(7));
    assert_eq!(request.params.user.as_deref(), Some("u-1"));
}

#[test]
fn test_every_recognized_param_is_settable() {
    let values = [
        ("temperature", json!(1.0)),
        ("max_tokens", json!(10)),
        ("max_completion_tokens", json!(10)),
        ("top_p", json!(0.5)),
        ("frequency_penalty", json!(0.1)),
        ("presence_penalty", json!(-0.1)),
        ("stop", json!("\n")),
        ("n", json!(1)),
        ("seed", json!(42)),
        ("user", json!("someone")),
    ];
    assert_eq!(values.len(), RECOGNIZED_PARAMS.len());

    let params = GenerationParams::from_options(values).unwrap();
    assert!(params.validate().is_ok());
    assert!(!params.is_empty());
}

#[test]
fn test_unknown_param_rejected() {
    let err = GenerationParams::from_options([("logit_bias", json!({}))]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
