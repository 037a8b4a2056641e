//! Chat relay to the generative-language provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::ApiError;

/// Page text sent as context is cut off at this many characters
pub const PAGE_TEXT_LIMIT: usize = 6000;

const INSTRUCTION: &str = "You are the assistant for Smart PT, a public transport companion app. \
Answer briefly and use the page context below when it is relevant.";

/// Optional page snapshot sent alongside a question
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "pageText")]
    pub page_text: Option<String>,
}

/// Build the single combined prompt forwarded upstream
pub fn build_prompt(prompt: &str, context: Option<&ChatContext>) -> String {
    let mut combined = String::from(INSTRUCTION);
    combined.push('\n');

    if let Some(context) = context {
        if let Some(url) = context.url.as_deref().filter(|u| !u.is_empty()) {
            combined.push_str("\nSource: ");
            combined.push_str(url);
            combined.push('\n');
        }
        if let Some(text) = context.page_text.as_deref().filter(|t| !t.is_empty()) {
            combined.push_str("\nPage content:\n");
            combined.extend(text.chars().take(PAGE_TEXT_LIMIT));
            combined.push('\n');
        }
    }

    combined.push_str("\nQuestion: ");
    combined.push_str(prompt);
    combined
}

/// Trait for the generative-language provider
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Forward a combined prompt and return the first textual reply
    async fn generate_reply(&self, prompt: &str) -> Result<String, ApiError>;
}

/// HTTP client for the generative-language REST endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_reply(&self, prompt: &str) -> Result<String, ApiError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingCredential("GOOGLE_GEMINI_API_KEY"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream {
                status: 500,
                message: format!("Chat provider unreachable: {}", e),
            })?;

        let status = response.status();
        let data: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = data
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Upstream error")
                .to_string();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let reply = data
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or("(No response)")
            .to_string();

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_question_and_instruction() {
        let prompt = build_prompt("When is the next 86 tram?", None);
        assert!(prompt.starts_with(INSTRUCTION));
        assert!(prompt.ends_with("Question: When is the next 86 tram?"));
        assert!(!prompt.contains("Source:"));
        assert!(!prompt.contains("Page content:"));
    }

    #[test]
    fn test_prompt_includes_context_blocks() {
        let context = ChatContext {
            url: Some("https://smartpt.example/disruptions".to_string()),
            page_text: Some("Route 86 delayed at Bourke St".to_string()),
        };
        let prompt = build_prompt("What is disrupted?", Some(&context));
        assert!(prompt.contains("Source: https://smartpt.example/disruptions"));
        assert!(prompt.contains("Page content:\nRoute 86 delayed at Bourke St"));
    }

    #[test]
    fn test_page_text_is_truncated() {
        let context = ChatContext {
            url: None,
            page_text: Some("x".repeat(PAGE_TEXT_LIMIT * 2)),
        };
        let prompt = build_prompt("q", Some(&context));
        let page_block = prompt
            .split("Page content:\n")
            .nth(1)
            .unwrap()
            .split('\n')
            .next()
            .unwrap();
        assert_eq!(page_block.len(), PAGE_TEXT_LIMIT);
    }

    #[test]
    fn test_empty_context_fields_are_skipped() {
        let context = ChatContext {
            url: Some(String::new()),
            page_text: Some(String::new()),
        };
        let prompt = build_prompt("q", Some(&context));
        assert!(!prompt.contains("Source:"));
        assert!(!prompt.contains("Page content:"));
    }
}
