//! LLM client for answer generation.
//!
//! Speaks the OpenAI-compatible chat completions API (works against OpenAI,
//! Ollama's /v1 endpoint, and most proxies) with optional tool calling.

pub mod prompts;
pub mod tools;

pub use prompts::AstrologyPrompts;
pub use prompts::PromptTemplate;
pub use tools::ChartSelection;
pub use tools::ToolSpec;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::errors::VedaRagError;

/// One chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A parsed tool invocation from the model
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One model turn: text, a tool call, or both
#[derive(Debug, Clone, Default)]
pub struct LlmTurn {
    pub content: Option<String>,
    pub tool_call: Option<ToolCall>,
}

/// Client for chat completion requests
pub struct LlmService {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: Client,
}

impl LlmService {
    /// Create a service from configuration
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            endpoint: config.llm_endpoint().to_string(),
            api_key: config.llm_key().to_string(),
            model: config.llm_model().to_string(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            client,
        })
    }

    /// Run one completion turn, optionally offering tools
    pub async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<LlmTurn> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            max_tokens: usize,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            tools: Vec<serde_json::Value>,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: Option<String>,
            #[serde(default)]
            tool_calls: Vec<RawToolCall>,
        }

        #[derive(Deserialize)]
        struct RawToolCall {
            function: RawFunction,
        }

        #[derive(Deserialize)]
        struct RawFunction {
            name: String,
            arguments: String,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {}", url);

        let request = Request {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.iter().map(ToolSpec::to_schema).collect(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VedaRagError::Llm(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: Response = response
            .json()
            .await
            .map_err(|e| VedaRagError::Llm(format!("Failed to parse response: {e}")))?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VedaRagError::Llm("No choices in response".to_string()))?;

        // Tool argument strings are model output and may be malformed
        let tool_call = choice
            .message
            .tool_calls
            .into_iter()
            .next()
            .map(|raw| -> Result<ToolCall> {
                let arguments = serde_json::from_str(&raw.function.arguments).map_err(|e| {
                    VedaRagError::Llm(format!("Malformed tool call arguments: {e}"))
                })?;
                Ok(ToolCall {
                    name: raw.function.name,
                    arguments,
                })
            })
            .transpose()?;

        let content = choice.message.content.filter(|c| !c.trim().is_empty());

        Ok(LlmTurn { content, tool_call })
    }

    /// Plain completion with no tools, returning text only
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = [ChatMessage::user(prompt)];
        let turn = self.complete(&messages, &[]).await?;
        turn.content
            .ok_or_else(|| VedaRagError::Llm("Model returned no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_roles() {
        assert_eq!(ChatMessage::system("x").role, "system");
        assert_eq!(ChatMessage::user("x").role, "user");
        assert_eq!(ChatMessage::assistant("x").role, "assistant");
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_live_completion() {
        let config = crate::config::AppConfig::load().unwrap();
        let service = LlmService::new(&config).unwrap();
        let answer = service.generate("Say hello in one word.").await.unwrap();
        assert!(!answer.is_empty());
    }
}
