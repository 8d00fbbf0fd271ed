//! Telegram Bot API adapter (long polling).
//!
//! Each incoming message is one independent pipeline run; the bot keeps no
//! conversation state. Polling errors back off and retry, they never bring
//! the bot down.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use weather_agent_core::PipelineRunner;

const GREETING: &str = "Weather assistant at your service!\n\n\
    Ask about the weather in any city, for example: \"What's the weather in London?\"";

const POLL_TIMEOUT_SECS: u32 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

struct BotApi {
    http: Client,
    base_url: String,
}

impl BotApi {
    fn new(token: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let res = self
            .http
            .get(format!("{}/getUpdates", self.base_url))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
            ])
            .send()
            .await
            .context("Failed to poll Telegram for updates")?;

        let parsed: UpdatesResponse = res
            .json()
            .await
            .context("Failed to parse Telegram getUpdates response")?;

        if !parsed.ok {
            bail!("Telegram getUpdates returned ok=false");
        }

        Ok(parsed.result)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("Failed to send Telegram message")?;

        Ok(())
    }

    /// Advisory "typing" indicator; a failure here must not affect the reply.
    async fn send_typing(&self, chat_id: i64) {
        let res = self
            .http
            .post(format!("{}/sendChatAction", self.base_url))
            .json(&json!({ "chat_id": chat_id, "action": "typing" }))
            .send()
            .await;

        if let Err(err) = res {
            tracing::debug!("sendChatAction for chat {chat_id} failed: {err}");
        }
    }
}

pub async fn run(token: &str, runner: &PipelineRunner) -> Result<()> {
    let api = BotApi::new(token);
    let mut offset = 0;

    tracing::info!("Telegram bot started and ready to answer queries");

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                tracing::warn!("Telegram polling failed: {err:#}");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            let chat_id = message.chat.id;

            if text.starts_with("/start") {
                if let Err(err) = api.send_message(chat_id, GREETING).await {
                    tracing::warn!("failed to greet chat {chat_id}: {err:#}");
                }
                continue;
            }
            // Other commands are not ours to answer.
            if text.starts_with('/') {
                continue;
            }

            api.send_typing(chat_id).await;
            let answer = runner.answer(&text).await;
            if let Err(err) = api.send_message(chat_id, &answer).await {
                tracing::warn!("failed to reply to chat {chat_id}: {err:#}");
            }
        }
    }
}
