use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use weather_agent_core::{
    Config, OpenAiClient, PipelineContext, PipelineRunner, QueryPipeline, WttrClient,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-agent", version, about = "Natural-language weather assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with the assistant on the console.
    Chat,

    /// Answer a single question and exit.
    Ask {
        /// The question, e.g. "What's the weather in London?".
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Run the Telegram bot (long polling).
    Bot,

    /// Configure credentials interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Chat => {
                let runner = runner_from_config(&Config::load()?)?;
                crate::console::run(&runner).await
            }
            Command::Ask { question } => {
                let runner = runner_from_config(&Config::load()?)?;
                let answer = runner.answer(&question.join(" ")).await;
                println!("{answer}");
                Ok(())
            }
            Command::Bot => {
                let config = Config::load()?;
                let token = config.require_telegram_bot_token()?.to_owned();
                let runner = runner_from_config(&config)?;
                crate::telegram::run(&token, &runner).await
            }
            Command::Configure => configure(),
        }
    }
}

/// Wire the production pipeline: OpenAI chat client + wttr.in source.
fn runner_from_config(config: &Config) -> Result<PipelineRunner> {
    let api_key = config.require_openai_api_key()?.to_owned();

    let ctx = PipelineContext::new(Arc::new(OpenAiClient::new(api_key)), config.model.clone());
    let pipeline = QueryPipeline::new(ctx, Arc::new(WttrClient::new()));

    Ok(PipelineRunner::new(pipeline))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenAI API key:")
        .without_confirmation()
        .prompt()?;
    config.openai_api_key = Some(api_key);

    let current_model = config.model.clone();
    let model = inquire::Text::new("Chat model:")
        .with_default(&current_model)
        .prompt()?;
    config.model = model;

    let token = inquire::Text::new("Telegram bot token (leave empty to skip):").prompt()?;
    config.telegram_bot_token = if token.trim().is_empty() {
        None
    } else {
        Some(token.trim().to_string())
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
