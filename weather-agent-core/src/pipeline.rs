use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::llm::{ChatClient, ChatMessage, LlmError};
use crate::model::WeatherRecord;
use crate::weather::WeatherSource;

/// Reply used when the query names no city or location.
pub const NO_LOCATION_REPLY: &str = "Please specify a city or location in your request.";

/// Reply used when a pipeline run fails.
pub const APOLOGY_REPLY: &str =
    "Sorry, an error occurred while processing your request. Please try again.";

const EXTRACT_LOCATION_INSTRUCTION: &str = "Extract the city or location name from the user's \
    weather query. Return only the city/location name, nothing else. If the query doesn't \
    contain a city/location, return an empty string.";

const GENERATE_RESPONSE_INSTRUCTION: &str = "You are a weather assistant. Use the provided \
    weather data to answer the user's question. Do not answer or ask anything else. Be \
    friendly and informative.";

/// Configuration shared by every model call within one pipeline run: the
/// chat client (which owns the credential) and the model identifier.
///
/// Built once, then passed by reference into each step. Nothing mutates it
/// after construction, so concurrent runs holding different contexts can
/// never observe each other's credential.
#[derive(Clone)]
pub struct PipelineContext {
    chat: Arc<dyn ChatClient>,
    model: String,
}

impl PipelineContext {
    pub fn new(chat: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self { chat, model: model.into() }
    }

    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.chat.complete(&self.model, &messages).await
    }
}

/// Free-text query to a location name, possibly empty after trimming.
/// Model failures propagate; this step has no fallback of its own.
async fn extract_location(ctx: &PipelineContext, user_input: &str) -> Result<String> {
    let messages = vec![
        ChatMessage::system(EXTRACT_LOCATION_INSTRUCTION),
        ChatMessage::user(user_input),
    ];

    let raw = ctx.generate(messages).await.context("Location extraction failed")?;
    Ok(raw.trim().to_string())
}

/// Weather record + original question to a natural-language answer,
/// returned unmodified. Model failures propagate.
async fn generate_response(
    ctx: &PipelineContext,
    weather: &WeatherRecord,
    user_input: &str,
) -> Result<String> {
    let weather_json = weather
        .prompt_json()
        .context("Failed to serialize weather record for the prompt")?;

    let messages = vec![
        ChatMessage::system(GENERATE_RESPONSE_INSTRUCTION),
        ChatMessage::user(user_input),
        ChatMessage::system(format!("Weather data: {weather_json}")),
    ];

    ctx.generate(messages).await.context("Response generation failed")
}

/// Strictly sequential orchestration: extraction, fetch, generation.
/// Each step's input is the prior step's output; there is no retry and
/// no parallelism anywhere in the chain.
pub struct QueryPipeline {
    ctx: PipelineContext,
    source: Arc<dyn WeatherSource>,
}

impl QueryPipeline {
    pub fn new(ctx: PipelineContext, source: Arc<dyn WeatherSource>) -> Self {
        Self { ctx, source }
    }

    /// Runs one query end to end.
    ///
    /// Returns the fixed clarification reply when extraction finds no
    /// location; the weather source and the generator are not invoked in
    /// that case. Any step failure propagates to [`PipelineRunner`].
    pub async fn run(&self, user_input: &str) -> Result<String> {
        let location = extract_location(&self.ctx, user_input).await?;
        if location.is_empty() {
            tracing::info!("query contains no location: {user_input:?}");
            return Ok(NO_LOCATION_REPLY.to_string());
        }
        tracing::info!("detected location: {location}");

        // The source contract says this is always Some; a None here means
        // the contract was broken and the run cannot continue.
        let weather = self
            .source
            .current(&location)
            .await
            .ok_or_else(|| anyhow!("Weather source returned no record for {location:?}"))?;

        tracing::info!(
            "fetched weather for {}: {}, {:.1} C",
            weather.location,
            weather.description,
            weather.temperature_c,
        );

        generate_response(&self.ctx, &weather, user_input).await
    }
}

/// Failure boundary around [`QueryPipeline`]: the only place where a
/// propagated error becomes a value. Callers always receive a plain
/// string, never an error.
pub struct PipelineRunner {
    pipeline: QueryPipeline,
}

impl PipelineRunner {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn answer(&self, query: &str) -> String {
        match self.pipeline.run(query).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!("query processing failed: {err:#}");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}
