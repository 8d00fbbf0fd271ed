use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Message role in a chat completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged content item of a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("failed to reach the chat completions endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat completions request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("failed to parse chat completions response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("chat completions response contained no message content")]
    EmptyCompletion,
}

/// Interface for sending chat-style prompts to a language model and
/// receiving text responses.
///
/// Implementors encapsulate transport and vendor-specific API details;
/// the pipeline stays decoupled from any particular provider.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the ordered messages to `model` and return the assistant's
    /// response text.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Non-streaming client for the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest { model, messages })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api { status, body: truncate_body(&body) });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(LlmError::Decode)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Back off to a char boundary; error bodies are not guaranteed to
        // be ASCII and slicing mid-character panics.
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_value(Role::System).unwrap(), "system");
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
    }

    #[test]
    fn request_body_shape() {
        let messages = vec![ChatMessage::system("Be terse."), ChatMessage::user("Hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
        })
        .unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be terse.");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn response_body_parses_without_optional_fields() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Hello!"}}],"usage":{"total_tokens":7}}"#,
        )
        .unwrap();

        let content = parsed.choices[0].message.content.as_deref();
        assert_eq!(content, Some("Hello!"));
    }

    #[test]
    fn with_base_url_overrides_default() {
        let client = OpenAiClient::new("key").with_base_url("http://localhost:1234/v1");
        assert_eq!(client.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_lands_on_a_char_boundary() {
        // Byte 200 falls inside the first two-byte character.
        let body = format!("{}{}", "a".repeat(199), "é".repeat(10));

        let truncated = truncate_body(&body);

        assert_eq!(truncated, format!("{}...", "a".repeat(199)));
    }

    #[test]
    fn multibyte_only_bodies_are_truncated_safely() {
        let body = "е".repeat(150); // 300 bytes
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.trim_end_matches("..."), "е".repeat(100));
    }
}
