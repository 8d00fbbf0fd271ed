//! Interactive console front end: one question per line, one pipeline run
//! per question.

use anyhow::Result;
use inquire::{InquireError, Text};

use weather_agent_core::PipelineRunner;

pub async fn run(runner: &PipelineRunner) -> Result<()> {
    println!("Weather assistant at your service!");
    println!("Ask about the weather in any city, for example: \"What's the weather in London?\"");
    println!("To exit type 'exit'");

    loop {
        let question = match Text::new("Your question:").prompt() {
            Ok(line) => line,
            // Ctrl-C / Ctrl-D end the session like 'exit' does.
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            break;
        }

        println!("Getting weather information...");
        let answer = runner.answer(question).await;
        println!("\n{answer}\n");
    }

    println!("Goodbye! Have a great day!");
    Ok(())
}
