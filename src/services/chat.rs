//! Chat completion backends.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ChatError, ConfigError};
use crate::models::{ChatConfig, ChatProvider};

/// Text generation conditioned on retrieved context.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Answer `prompt` using `context` as the only source of facts.
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ChatError>;

    /// Model identifier, for logs and status output.
    fn model(&self) -> &str;
}

/// Pick the chat backend named by `config.provider`.
pub fn create_chat_model(config: &ChatConfig) -> Result<Box<dyn ChatModel>, ConfigError> {
    match config.provider {
        ChatProvider::OpenAi => Ok(Box::new(OpenAiChat::new(config)?)),
        ChatProvider::Gemini => Ok(Box::new(GeminiChat::new(config)?)),
    }
}

fn http_client(timeout_secs: u64) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::ValidationError(format!("failed to build HTTP client: {}", e)))
}

fn required_key(key: Option<&String>, name: &str) -> Result<String, ConfigError> {
    key.filter(|k| !k.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::ValidationError(format!("{} is not set", name)))
}

fn map_send_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::RequestError(e)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::ProviderError(format!("status {}: {}", status, body)))
}

fn user_message(prompt: &str, context: &str) -> String {
    if context.is_empty() {
        prompt.to_string()
    } else {
        format!("Context:\n{}\n\nQuestion:\n{}", context, prompt)
    }
}

// OpenAI

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct OpenAiChat {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(config: &ChatConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.openai_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            api_key: required_key(config.openai_api_key.as_ref(), "OPENAI_API_KEY")?,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ChatError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: user_message(prompt, context),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let completion: ChatCompletionResponse = check_status(response).await?.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChatError::EmptyCompletion(self.model.clone()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

pub struct GeminiChat {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiChat {
    pub fn new(config: &ChatConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.gemini_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: required_key(config.google_api_key.as_ref(), "GOOGLE_API_KEY")?,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ChatError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_message(prompt, context),
                }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let generated: GenerateContentResponse = check_status(response).await?.json().await?;
        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ChatError::EmptyCompletion(self.model.clone()));
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selection() {
        let config = ChatConfig {
            openai_api_key: Some("sk-test".to_string()),
            google_api_key: Some("g-test".to_string()),
            ..Default::default()
        };
        let model = create_chat_model(&config).unwrap();
        assert_eq!(model.model(), "gpt-4o");

        let config = ChatConfig {
            provider: ChatProvider::Gemini,
            ..config
        };
        let model = create_chat_model(&config).unwrap();
        assert_eq!(model.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        let config = ChatConfig {
            provider: ChatProvider::Gemini,
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            create_chat_model(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_user_message_layout() {
        assert_eq!(user_message("hi", ""), "hi");
        assert_eq!(
            user_message("which panel?", "1. Panel"),
            "Context:\n1. Panel\n\nQuestion:\nwhich panel?"
        );
    }

    #[test]
    fn test_gemini_response_parsing() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Try "},{"text":"LP-60"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Try LP-60");
    }
}
