//! End-to-end pipeline tests wiring the real HTTP clients to mock servers.

use std::sync::Arc;

use weather_agent_core::{
    OpenAiClient, PipelineContext, PipelineRunner, QueryPipeline, WttrClient,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn wttr_body() -> serde_json::Value {
    serde_json::json!({
        "current_condition": [{
            "temp_C": "21",
            "FeelsLikeC": "19",
            "humidity": "64",
            "windspeedKmph": "12",
            "observation_time": "09:30 AM",
            "weatherDesc": [{ "value": "Sunny" }]
        }],
        "nearest_area": [{
            "areaName": [{ "value": "Paris" }]
        }]
    })
}

fn runner(llm_uri: String, wttr_uri: String) -> PipelineRunner {
    let ctx = PipelineContext::new(
        Arc::new(OpenAiClient::new("test-key").with_base_url(llm_uri)),
        "gpt-4o-mini",
    );
    let pipeline = QueryPipeline::new(ctx, Arc::new(WttrClient::new().with_base_url(wttr_uri)));
    PipelineRunner::new(pipeline)
}

#[tokio::test]
async fn answers_a_paris_query_end_to_end() {
    let llm = MockServer::start().await;
    let wttr = MockServer::start().await;

    // Extraction and generation requests are told apart by their system
    // instructions.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Extract the city"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Paris")))
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Weather data:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "It is 21 C and sunny in Paris right now.",
        )))
        .mount(&llm)
        .await;

    Mock::given(method("GET"))
        .and(path("/Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wttr_body()))
        .mount(&wttr)
        .await;

    let runner = runner(llm.uri(), wttr.uri());
    let answer = runner.answer("What's the weather in Paris?").await;

    assert_eq!(answer, "It is 21 C and sunny in Paris right now.");
}

#[tokio::test]
async fn weather_outage_still_produces_an_answer() {
    let llm = MockServer::start().await;
    let wttr = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Extract the city"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Zzqqxx")))
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Information unavailable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "I could not get live data for Zzqqxx, sorry.",
        )))
        .mount(&llm)
        .await;

    Mock::given(method("GET"))
        .and(path("/Zzqqxx"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown location"))
        .mount(&wttr)
        .await;

    let runner = runner(llm.uri(), wttr.uri());
    let answer = runner.answer("Weather in Zzqqxx").await;

    assert_eq!(answer, "I could not get live data for Zzqqxx, sorry.");
}
