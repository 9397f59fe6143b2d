//! Request building and response parsing benchmarks

use cacheai::models::*;
use cacheai::services::error_mapper::classify;
use cacheai::services::RawResponse;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

/// Create a response body with the given number of choices
fn create_response_body(choices: usize) -> String {
    let choices: Vec<serde_json::Value> = (0..choices)
        .map(|i| {
            json!({
                "index": i,
                "message": {"role": "assistant", "content": "The quick brown fox jumps over the lazy dog. ".repeat(20)},
                "finish_reason": "stop"
            })
        })
        .collect();

    json!({
        "id": "chatcmpl-bench",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o",
        "choices": choices,
        "usage": {"prompt_tokens": 120, "completion_tokens": 400, "total_tokens": 520}
    })
    .to_string()
}

/// Create a multi-turn request
fn create_request(turns: usize) -> ChatCompletionRequest {
    let mut messages = vec![ChatMessage::system("You are a helpful assistant.")];
    for i in 0..turns {
        messages.push(ChatMessage::user(format!("Question number {}?", i)));
        messages.push(ChatMessage::assistant(format!("Answer number {}.", i)));
    }

    ChatCompletionRequest::new(
        "gpt-4o",
        messages,
        GenerationParams::new().temperature(0.7).max_tokens(256),
    )
}

fn bench_parse_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_completion");

    for choices in [1, 4, 16] {
        let body = create_response_body(choices);
        group.bench_with_input(BenchmarkId::from_parameter(choices), &body, |b, body| {
            b.iter(|| parse_completion(black_box(body.as_bytes())).unwrap())
        });
    }

    group.finish();
}

fn bench_serialize_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_request");

    for turns in [1, 10, 50] {
        let request = create_request(turns);
        group.bench_with_input(BenchmarkId::from_parameter(turns), &request, |b, request| {
            b.iter(|| {
                request.validate().unwrap();
                serde_json::to_vec(black_box(request)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_classify_error(c: &mut Criterion) {
    let body = json!({"error": {"message": "rate limited", "type": "rate_limit_error", "code": "rl_1"}}).to_string();

    c.bench_function("classify_rate_limit", |b| {
        b.iter(|| classify(black_box(RawResponse::new(429, body.clone()))).unwrap_err())
    });
}

criterion_group!(benches, bench_parse_completion, bench_serialize_request, bench_classify_error);
criterion_main!(benches);
