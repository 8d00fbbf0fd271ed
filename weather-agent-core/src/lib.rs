//! Core library for the weather assistant.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The chat-model client seam and its OpenAI implementation
//! - The wttr.in weather data source with its degraded-result policy
//! - The query pipeline and its failure boundary
//!
//! It is used by `weather-agent-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod weather;

pub use config::Config;
pub use llm::{ChatClient, ChatMessage, LlmError, OpenAiClient, Role};
pub use model::{UNAVAILABLE_DESCRIPTION, WeatherRecord};
pub use pipeline::{
    APOLOGY_REPLY, NO_LOCATION_REPLY, PipelineContext, PipelineRunner, QueryPipeline,
};
pub use weather::{WeatherSource, WttrClient};
