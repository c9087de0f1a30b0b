//! OpenAI-compatible chat completion client.
//!
//! Sends a single system + user exchange and never surfaces an error to the
//! caller: any failure falls back to the offline knowledge base.

use super::KnowledgeBase;
use crate::config::ChatConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion request.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Answers civic questions through an LLM, with an offline fallback.
pub struct ChatClient {
    config: ChatConfig,
    api_key: Option<String>,
    http_client: reqwest::Client,
    knowledge: KnowledgeBase,
}

impl ChatClient {
    /// Create a client, reading the credential from the configured env var.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set; chat answers will come from the offline knowledge base",
                config.api_key_env
            );
        }
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ChatConfig, api_key: Option<String>) -> Result<Self> {
        info!("Initializing chat client with model {}", config.model);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let knowledge = KnowledgeBase::new(config.knowledge.clone(), config.fallback_message.clone());

        Ok(Self {
            config,
            api_key,
            http_client,
            knowledge,
        })
    }

    /// Answer a question. Never fails.
    pub async fn ask(&self, question: &str) -> String {
        match self.complete(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Chat API unavailable, using fallback: {:#}", e);
                self.knowledge.answer(question).to_string()
            }
        }
    }

    async fn complete(&self, question: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No API key configured"))?;

        let request = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.config.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending chat request to {}", self.config.api_url);

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to chat API at {}", self.config.api_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Chat API error {}: {}", status, body));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat response contained no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer one request with `body`, returning the raw request text.
    async fn serve_once(status: u16, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if buf.len() >= split + 4 + length {
                        break;
                    }
                }
            }

            let reply = format!(
                "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}/openai/v1/chat/completions", addr), handle)
    }

    fn config_for(url: String) -> ChatConfig {
        ChatConfig {
            api_url: url,
            timeout_seconds: 5,
            ..ChatConfig::default()
        }
    }

    #[tokio::test]
    async fn test_answer_from_api() {
        let (url, handle) = serve_once(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"Ward meetings are on Tuesdays."}}]}"#,
        )
        .await;

        let client = ChatClient::with_api_key(config_for(url), Some("test-key".into())).unwrap();
        let answer = client.ask("When are ward meetings?").await;
        assert_eq!(answer, "Ward meetings are on Tuesdays.");

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /openai/v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains("When are ward meetings?"));
        assert!(request.contains("\"max_tokens\":300"));
    }

    #[tokio::test]
    async fn test_api_error_falls_back() {
        let (url, _handle) = serve_once(429, r#"{"error":{"message":"rate limited"}}"#).await;

        let client = ChatClient::with_api_key(config_for(url), Some("test-key".into())).unwrap();
        let answer = client.ask("Is the hospital open?").await;
        assert!(answer.contains("health department"));
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_without_request() {
        let client =
            ChatClient::with_api_key(config_for("http://127.0.0.1:9/unused".into()), None).unwrap();
        let answer = client.ask("tell me about the weather").await;
        assert_eq!(answer, ChatConfig::default().fallback_message);
    }

    #[tokio::test]
    async fn test_empty_choices_fall_back() {
        let (url, _handle) = serve_once(200, r#"{"choices":[]}"#).await;

        let client = ChatClient::with_api_key(config_for(url), Some("k".into())).unwrap();
        let answer = client.ask("school fees").await;
        assert!(answer.contains("school board"));
    }
}
